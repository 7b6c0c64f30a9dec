use crate::model::{Assignment, Employee, Network, Operation, Project, Relationship, Resource};
use crate::timeline::Interval;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("required input missing: {0}")]
    InputMissing(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(message.unwrap_or_else(|| err.to_string()))
            }
            other => Self::Sqlite(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row counts for every table of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetCounts {
    pub facilities: usize,
    pub resources: usize,
    pub employees: usize,
    pub active_employees: usize,
    pub projects: usize,
    pub networks: usize,
    pub operations: usize,
    pub relationships: usize,
    pub assignments: usize,
}

/// Read access to the intervals already booked on each resource.
pub trait BookingLookup {
    /// Number of booked operations on `resource_id` whose `[start, end)`
    /// overlaps `candidate`.
    fn count_overlapping(&self, resource_id: i64, candidate: &Interval) -> StoreResult<usize>;
}

pub trait StaffLookup {
    /// Active employees bound to `resource_id`, in id order.
    fn active_employees(&self, resource_id: i64) -> StoreResult<Vec<Employee>>;
}

/// The exclusive write session a generation run works through.
///
/// Writes become visible to later reads of the same session immediately and
/// durable only after [`DatasetSession::commit`]. Dropping a session without
/// committing discards everything it wrote.
pub trait DatasetSession: BookingLookup + StaffLookup {
    fn projects(&self) -> StoreResult<Vec<Project>>;
    fn resources(&self) -> StoreResult<Vec<Resource>>;
    fn counts(&self) -> StoreResult<DatasetCounts>;

    fn insert_network(&mut self, network: &Network) -> StoreResult<()>;
    fn insert_operation(&mut self, operation: &Operation) -> StoreResult<()>;
    fn insert_relationship(&mut self, relationship: &Relationship) -> StoreResult<()>;
    fn insert_assignment(&mut self, assignment: &Assignment) -> StoreResult<()>;

    fn commit(self) -> StoreResult<()>
    where
        Self: Sized;
}

/// Every row of a finished dataset, for auditing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    pub resources: Vec<Resource>,
    pub employees: Vec<Employee>,
    pub projects: Vec<Project>,
    pub networks: Vec<Network>,
    pub operations: Vec<Operation>,
    pub relationships: Vec<Relationship>,
    pub assignments: Vec<Assignment>,
}

pub mod seed;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use seed::{ProjectSeed, SeedData};
