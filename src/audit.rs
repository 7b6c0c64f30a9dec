//! Structural checks over a finished dataset.
//!
//! The audit reads a [`DatasetSnapshot`] and reports every place where the
//! generated rows break the dataset invariants: resource double-booking,
//! operations escaping their project window, predecessor rules, cycles,
//! staffing drawn from the wrong resource and duplicate identifiers.

use crate::config::GeneratorConfig;
use crate::graph::NetworkDag;
use crate::model::{Employee, Operation, Relationship};
use crate::persistence::DatasetSnapshot;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLimits {
    pub max_predecessors: usize,
    pub max_assignments: usize,
}

impl Default for AuditLimits {
    fn default() -> Self {
        Self {
            max_predecessors: 3,
            max_assignments: 3,
        }
    }
}

impl From<&GeneratorConfig> for AuditLimits {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            max_predecessors: config.max_predecessors,
            max_assignments: config.assignments_per_operation.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredecessorViolation {
    pub operation_id: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub operations_checked: usize,
    /// Operation id pairs `(a, b)`, `a < b`, booked on the same resource with
    /// intersecting `[start, end)` intervals.
    pub overlapping_pairs: Vec<(i64, i64)>,
    pub empty_intervals: Vec<i64>,
    pub starts_before_window: Vec<i64>,
    /// Only expected where the duration exceeds the window and the one-day
    /// nudge applied.
    pub ends_after_window: Vec<i64>,
    pub predecessor_violations: Vec<PredecessorViolation>,
    pub cyclic_networks: Vec<i64>,
    pub cross_network_relationships: Vec<i64>,
    pub assignment_mismatches: Vec<i64>,
    pub overstaffed_operations: Vec<i64>,
    pub duplicate_ids: Vec<String>,
}

impl AuditReport {
    /// Structural violations. Overlaps and window overruns are best-effort
    /// properties and only count when `strict_overlaps` is set.
    pub fn violation_count(&self, strict_overlaps: bool) -> usize {
        let mut total = self.empty_intervals.len()
            + self.starts_before_window.len()
            + self.predecessor_violations.len()
            + self.cyclic_networks.len()
            + self.cross_network_relationships.len()
            + self.assignment_mismatches.len()
            + self.overstaffed_operations.len()
            + self.duplicate_ids.len();
        if strict_overlaps {
            total += self.overlapping_pairs.len() + self.ends_after_window.len();
        }
        total
    }

    pub fn is_clean(&self) -> bool {
        self.violation_count(false) == 0
    }

    pub fn to_cli_summary(&self) -> String {
        [
            format!("operations={}", self.operations_checked),
            format!("overlaps={}", self.overlapping_pairs.len()),
            format!("empty_intervals={}", self.empty_intervals.len()),
            format!("starts_before_window={}", self.starts_before_window.len()),
            format!("ends_after_window={}", self.ends_after_window.len()),
            format!("predecessor_violations={}", self.predecessor_violations.len()),
            format!("cyclic_networks={}", self.cyclic_networks.len()),
            format!(
                "cross_network_relationships={}",
                self.cross_network_relationships.len()
            ),
            format!("assignment_mismatches={}", self.assignment_mismatches.len()),
            format!("overstaffed={}", self.overstaffed_operations.len()),
            format!("duplicate_ids={}", self.duplicate_ids.len()),
        ]
        .join(", ")
    }
}

pub fn audit_dataset(snapshot: &DatasetSnapshot, limits: AuditLimits) -> AuditReport {
    let mut report = AuditReport {
        operations_checked: snapshot.operations.len(),
        overlapping_pairs: overlapping_pairs(&snapshot.operations),
        ..AuditReport::default()
    };

    check_duplicate_ids(snapshot, &mut report);
    check_windows(snapshot, &mut report);
    check_precedence(snapshot, limits, &mut report);
    check_staffing(snapshot, limits, &mut report);
    report
}

/// Finds every pair of operations double-booked on a resource. Resources are
/// swept in parallel.
pub fn overlapping_pairs(operations: &[Operation]) -> Vec<(i64, i64)> {
    let mut by_resource: HashMap<i64, Vec<&Operation>> = HashMap::new();
    for operation in operations {
        by_resource
            .entry(operation.resource_id)
            .or_default()
            .push(operation);
    }

    let mut pairs: Vec<(i64, i64)> = by_resource
        .into_values()
        .collect::<Vec<_>>()
        .into_par_iter()
        .flat_map(|mut booked| {
            booked.sort_by_key(|op| (op.start, op.end, op.id));
            let mut found = Vec::new();
            for (i, current) in booked.iter().enumerate() {
                for later in &booked[i + 1..] {
                    if later.start >= current.end {
                        break;
                    }
                    if current.interval().overlaps(&later.interval()) {
                        found.push((current.id.min(later.id), current.id.max(later.id)));
                    }
                }
            }
            found
        })
        .collect();
    pairs.sort_unstable();
    pairs
}

fn check_duplicate_ids(snapshot: &DatasetSnapshot, report: &mut AuditReport) {
    let mut record = |kind: &str, ids: Vec<i64>| {
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(id) {
                report.duplicate_ids.push(format!("{kind}:{id}"));
            }
        }
    };
    record("network", snapshot.networks.iter().map(|n| n.id).collect());
    record("operation", snapshot.operations.iter().map(|o| o.id).collect());
    record(
        "relationship",
        snapshot.relationships.iter().map(|r| r.id).collect(),
    );
    record(
        "assignment",
        snapshot.assignments.iter().map(|a| a.id).collect(),
    );
}

fn check_windows(snapshot: &DatasetSnapshot, report: &mut AuditReport) {
    let projects: HashMap<i64, _> = snapshot.projects.iter().map(|p| (p.id, p)).collect();
    let network_project: HashMap<i64, i64> = snapshot
        .networks
        .iter()
        .map(|n| (n.id, n.project_id))
        .collect();

    for operation in &snapshot.operations {
        if operation.start >= operation.end {
            report.empty_intervals.push(operation.id);
        }
        let Some(project) = network_project
            .get(&operation.network_id)
            .and_then(|project_id| projects.get(project_id))
        else {
            continue;
        };
        if operation.start < project.planned_start {
            report.starts_before_window.push(operation.id);
        }
        if operation.end > project.planned_end {
            report.ends_after_window.push(operation.id);
        }
    }
}

fn check_precedence(snapshot: &DatasetSnapshot, limits: AuditLimits, report: &mut AuditReport) {
    let mut by_network: HashMap<i64, Vec<&Operation>> = HashMap::new();
    for operation in &snapshot.operations {
        by_network
            .entry(operation.network_id)
            .or_default()
            .push(operation);
    }
    let operations: HashMap<i64, &Operation> =
        snapshot.operations.iter().map(|o| (o.id, o)).collect();

    let mut incoming: HashMap<i64, Vec<&Relationship>> = HashMap::new();
    for relationship in &snapshot.relationships {
        incoming
            .entry(relationship.successor_id)
            .or_default()
            .push(relationship);
    }

    let mut network_ids: Vec<i64> = by_network.keys().copied().collect();
    network_ids.sort_unstable();

    for network_id in network_ids {
        let mut members = by_network.remove(&network_id).unwrap_or_default();
        members.sort_by_key(|op| op.sequence);

        let mut network_edges: Vec<Relationship> = Vec::new();
        for (position, successor) in members.iter().enumerate() {
            let edges = incoming.get(&successor.id).map(Vec::as_slice).unwrap_or(&[]);
            let allowed = limits.max_predecessors.min(position);
            let expected_min = usize::from(position > 0);
            if edges.len() < expected_min || edges.len() > allowed {
                report.predecessor_violations.push(PredecessorViolation {
                    operation_id: successor.id,
                    reason: format!(
                        "has {} predecessors at position {position}, expected {expected_min}..={allowed}",
                        edges.len()
                    ),
                });
            }
            for edge in edges {
                match operations.get(&edge.predecessor_id) {
                    Some(predecessor) if predecessor.network_id != network_id => {
                        report.cross_network_relationships.push(edge.id);
                    }
                    Some(predecessor) if predecessor.sequence >= successor.sequence => {
                        report.predecessor_violations.push(PredecessorViolation {
                            operation_id: successor.id,
                            reason: format!(
                                "predecessor {} was not created before it",
                                predecessor.id
                            ),
                        });
                        network_edges.push((*edge).clone());
                    }
                    Some(_) => network_edges.push((*edge).clone()),
                    None => report.cross_network_relationships.push(edge.id),
                }
            }
        }

        let owned: Vec<Operation> = members.into_iter().cloned().collect();
        if !NetworkDag::build(&owned, &network_edges).is_acyclic() {
            report.cyclic_networks.push(network_id);
        }
    }
}

fn check_staffing(snapshot: &DatasetSnapshot, limits: AuditLimits, report: &mut AuditReport) {
    let employees: HashMap<i64, &Employee> =
        snapshot.employees.iter().map(|e| (e.id, e)).collect();
    let operations: HashMap<i64, &Operation> =
        snapshot.operations.iter().map(|o| (o.id, o)).collect();

    let mut per_operation: HashMap<i64, usize> = HashMap::new();
    for assignment in &snapshot.assignments {
        *per_operation.entry(assignment.operation_id).or_default() += 1;
        let matches = match (
            operations.get(&assignment.operation_id),
            employees.get(&assignment.employee_id),
        ) {
            (Some(operation), Some(employee)) => employee.resource_id == Some(operation.resource_id),
            _ => false,
        };
        if !matches {
            report.assignment_mismatches.push(assignment.id);
        }
    }

    let mut overstaffed: Vec<i64> = per_operation
        .into_iter()
        .filter(|(_, count)| *count > limits.max_assignments)
        .map(|(operation_id, _)| operation_id)
        .collect();
    overstaffed.sort_unstable();
    report.overstaffed_operations = overstaffed;
}
