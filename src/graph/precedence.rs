use crate::config::Bounds;
use crate::context::GenerationContext;
use crate::model::{Operation, Relationship, RelationshipKind};
use crate::timeline::iso_hours;
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrecedenceError {
    #[error(
        "operation {predecessor} (index {predecessor_index}) cannot precede operation {successor} (index {successor_index})"
    )]
    OrderViolation {
        predecessor: i64,
        predecessor_index: usize,
        successor: i64,
        successor_index: usize,
    },
    #[error("operations {predecessor} and {successor} belong to different networks")]
    CrossNetwork { predecessor: i64, successor: i64 },
}

/// Wires the operations of one network into a precedence graph.
///
/// Predecessors are only ever drawn from operations created earlier, and
/// every edge is checked against the operations' `sequence` before it is
/// emitted, so the result is acyclic.
#[derive(Debug, Clone, Copy)]
pub struct PrecedenceGraphBuilder {
    max_predecessors: usize,
    buffer_hours: Bounds<u32>,
}

impl Default for PrecedenceGraphBuilder {
    fn default() -> Self {
        Self::new(3, Bounds::new(0, 24))
    }
}

impl PrecedenceGraphBuilder {
    pub fn new(max_predecessors: usize, buffer_hours: Bounds<u32>) -> Self {
        Self {
            max_predecessors: max_predecessors.max(1),
            buffer_hours,
        }
    }

    /// `operations` must be one network's operations in creation order.
    /// Position 0 gets no predecessors; position `i` gets between 1 and
    /// `min(max_predecessors, i)` distinct ones from positions `[0, i)`.
    pub fn build<R: Rng + ?Sized>(
        &self,
        operations: &[Operation],
        ctx: &mut GenerationContext,
        rng: &mut R,
    ) -> Result<Vec<Relationship>, PrecedenceError> {
        let mut relationships = Vec::new();
        for (position, successor) in operations.iter().enumerate().skip(1) {
            let wanted = rng.random_range(1..=self.max_predecessors).min(position);
            let predecessors: Vec<&Operation> = operations[..position]
                .choose_multiple(rng, wanted)
                .collect();

            for predecessor in predecessors {
                check_edge(predecessor, successor)?;
                let kind = RelationshipKind::ALL[rng.random_range(0..RelationshipKind::ALL.len())];
                let buffer_hours = rng.random_range(self.buffer_hours.min..=self.buffer_hours.max);
                relationships.push(Relationship {
                    id: ctx.next_relationship_id(),
                    predecessor_id: predecessor.id,
                    successor_id: successor.id,
                    kind,
                    buffer: iso_hours(buffer_hours),
                    remark: format!("{kind} relationship with {buffer_hours}h buffer"),
                });
            }
        }
        Ok(relationships)
    }
}

fn check_edge(predecessor: &Operation, successor: &Operation) -> Result<(), PrecedenceError> {
    if predecessor.network_id != successor.network_id {
        return Err(PrecedenceError::CrossNetwork {
            predecessor: predecessor.id,
            successor: successor.id,
        });
    }
    if predecessor.sequence >= successor.sequence {
        return Err(PrecedenceError::OrderViolation {
            predecessor: predecessor.id,
            predecessor_index: predecessor.sequence,
            successor: successor.id,
            successor_index: successor.sequence,
        });
    }
    Ok(())
}
