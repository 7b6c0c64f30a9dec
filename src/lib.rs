pub mod allocation;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod context;
pub mod generator;
pub mod graph;
#[cfg(feature = "cli")]
pub mod logging;
pub mod model;
pub mod persistence;
pub mod retry;
pub mod timeline;

pub use allocation::{AssignmentAllocator, SlotAllocation, TimeSlotAllocator};
pub use audit::{AuditLimits, AuditReport, audit_dataset};
pub use catalog::NameCatalogs;
pub use config::{Bounds, ConfigError, GeneratorConfig};
pub use context::{GenerationContext, OverlapWarning};
pub use generator::{GenerationError, GenerationSummary, Generator};
pub use graph::{NetworkDag, PrecedenceError, PrecedenceGraphBuilder};
pub use model::{
    Assignment, Employee, Facility, Network, Operation, OperationStatus, Project, Relationship,
    RelationshipKind, Resource,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::{SqliteDatasetStore, SqliteSession};
pub use persistence::{
    BookingLookup, DatasetCounts, DatasetSession, DatasetSnapshot, SeedData, StaffLookup,
    StoreError, StoreResult,
};
pub use timeline::Interval;
