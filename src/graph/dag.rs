use crate::model::{Operation, Relationship, RelationshipKind};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Directed graph over one network: operations are nodes, relationships run
/// predecessor -> successor.
pub struct NetworkDag {
    pub graph: DiGraph<i64, RelationshipKind>,
    pub id_to_index: HashMap<i64, NodeIndex>,
    /// Relationships whose endpoints are not both among the given operations.
    pub foreign_edges: Vec<i64>,
}

impl NetworkDag {
    pub fn build(operations: &[Operation], relationships: &[Relationship]) -> Self {
        let mut graph: DiGraph<i64, RelationshipKind> = DiGraph::new();
        let mut id_to_index: HashMap<i64, NodeIndex> = HashMap::new();

        for operation in operations {
            let node_ix = graph.add_node(operation.id);
            id_to_index.insert(operation.id, node_ix);
        }

        let mut foreign_edges = Vec::new();
        for relationship in relationships {
            match (
                id_to_index.get(&relationship.predecessor_id),
                id_to_index.get(&relationship.successor_id),
            ) {
                (Some(&u), Some(&v)) => {
                    graph.add_edge(u, v, relationship.kind);
                }
                _ => foreign_edges.push(relationship.id),
            }
        }

        Self {
            graph,
            id_to_index,
            foreign_edges,
        }
    }

    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Operation ids in a dependency-respecting order, or `None` on a cycle.
    pub fn topological_order(&self) -> Option<Vec<i64>> {
        toposort(&self.graph, None)
            .ok()
            .map(|order| order.into_iter().map(|ix| self.graph[ix]).collect())
    }
}
