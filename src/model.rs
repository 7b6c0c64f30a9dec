use crate::timeline::Interval;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// A schedulable asset at one facility. Operations and employees bind to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub facility_id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    /// Resource the employee works on, if any.
    #[serde(default)]
    pub resource_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Top-level planning unit. Its planned window bounds everything generated for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub planned_start: DateTime<Utc>,
    pub planned_end: DateTime<Utc>,
}

impl Project {
    /// Planned window snapped inward to whole seconds.
    pub fn window(&self) -> Interval {
        Interval::new(self.planned_start, self.planned_end).whole_seconds()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: i64,
    pub project_id: i64,
    /// `NP-01`, `NP-02`, ... unique within the project.
    pub code: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Planned,
    InProgress,
    Completed,
    Paused,
}

impl OperationStatus {
    pub const ALL: [OperationStatus; 4] = [
        OperationStatus::Planned,
        OperationStatus::InProgress,
        OperationStatus::Completed,
        OperationStatus::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Planned => "planned",
            OperationStatus::InProgress => "in_progress",
            OperationStatus::Completed => "completed",
            OperationStatus::Paused => "paused",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: i64,
    pub network_id: i64,
    pub resource_id: i64,
    /// `OP-001`, `OP-002`, ... unique within the network.
    pub code: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub progress_pct: f64,
    pub status: OperationStatus,
    pub description: String,
    /// Creation position inside the network; doubles as the topological index.
    #[serde(default)]
    pub sequence: usize,
}

impl Operation {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// The four precedence kinds between a predecessor and a successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// Finish-to-start.
    #[serde(rename = "FS")]
    FinishToStart,
    /// Start-to-start.
    #[serde(rename = "SS")]
    StartToStart,
    /// Finish-to-finish.
    #[serde(rename = "FF")]
    FinishToFinish,
    /// Start-to-finish.
    #[serde(rename = "SF")]
    StartToFinish,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 4] = [
        RelationshipKind::FinishToStart,
        RelationshipKind::StartToStart,
        RelationshipKind::FinishToFinish,
        RelationshipKind::StartToFinish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::FinishToStart => "FS",
            RelationshipKind::StartToStart => "SS",
            RelationshipKind::FinishToFinish => "FF",
            RelationshipKind::StartToFinish => "SF",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed precedence edge between two operations of one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: i64,
    pub predecessor_id: i64,
    pub successor_id: i64,
    pub kind: RelationshipKind,
    /// Lag as an ISO-8601 duration, e.g. `PT6H`.
    pub buffer: String,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub operation_id: i64,
    pub employee_id: i64,
    pub role: String,
    /// Share of the employee's capacity, in (0, 100].
    pub capacity_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in OperationStatus::ALL {
            assert_eq!(OperationStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(OperationStatus::from_str("cancelled"), None);
    }

    #[test]
    fn relationship_kind_serializes_as_short_code() {
        let json = serde_json::to_string(&RelationshipKind::StartToFinish).unwrap();
        assert_eq!(json, "\"SF\"");
        assert_eq!(
            RelationshipKind::from_str("FS"),
            Some(RelationshipKind::FinishToStart)
        );
    }
}
