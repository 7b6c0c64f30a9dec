use serde::{Deserialize, Serialize};

/// Monotonic identifier source. Never rewinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence {
    next: i64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// An operation whose slot was accepted even though it overlaps another
/// booking on the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapWarning {
    pub operation_id: i64,
    pub resource_id: i64,
    pub attempts: usize,
}

/// Mutable state threaded through one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    networks: IdSequence,
    operations: IdSequence,
    relationships: IdSequence,
    assignments: IdSequence,
    overlap_warnings: Vec<OverlapWarning>,
    unstaffed_operations: Vec<i64>,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_network_id(&mut self) -> i64 {
        self.networks.next_id()
    }

    pub fn next_operation_id(&mut self) -> i64 {
        self.operations.next_id()
    }

    pub fn next_relationship_id(&mut self) -> i64 {
        self.relationships.next_id()
    }

    pub fn next_assignment_id(&mut self) -> i64 {
        self.assignments.next_id()
    }

    pub fn record_overlap(&mut self, warning: OverlapWarning) {
        self.overlap_warnings.push(warning);
    }

    pub fn record_unstaffed(&mut self, operation_id: i64) {
        self.unstaffed_operations.push(operation_id);
    }

    pub fn into_findings(self) -> (Vec<OverlapWarning>, Vec<i64>) {
        (self.overlap_warnings, self.unstaffed_operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent_and_monotonic() {
        let mut ctx = GenerationContext::new();
        assert_eq!(ctx.next_network_id(), 1);
        assert_eq!(ctx.next_operation_id(), 1);
        assert_eq!(ctx.next_operation_id(), 2);
        assert_eq!(ctx.next_network_id(), 2);
        assert_eq!(ctx.next_relationship_id(), 1);
        assert_eq!(ctx.next_assignment_id(), 1);
        assert_eq!(ctx.next_operation_id(), 3);
    }

    #[test]
    fn findings_are_collected_in_order() {
        let mut ctx = GenerationContext::new();
        ctx.record_unstaffed(4);
        ctx.record_overlap(OverlapWarning {
            operation_id: 9,
            resource_id: 2,
            attempts: 50,
        });
        ctx.record_unstaffed(7);
        let (overlaps, unstaffed) = ctx.into_findings();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(unstaffed, vec![4, 7]);
    }
}
