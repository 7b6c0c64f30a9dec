use crate::allocation::{AssignmentAllocator, TimeSlotAllocator};
use crate::catalog::NameCatalogs;
use crate::config::{ConfigError, GeneratorConfig};
use crate::context::{GenerationContext, OverlapWarning};
use crate::graph::{PrecedenceError, PrecedenceGraphBuilder};
use crate::model::{Network, Operation, OperationStatus, Project, Resource};
use crate::persistence::{DatasetCounts, DatasetSession, StoreError};
use crate::timeline::hours_to_duration;
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Every variant aborts the run. Slot collisions and unstaffed resources are
/// not errors; they are reported through [`GenerationSummary`].
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("required input missing: {0}")]
    InputMissing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Precedence(#[from] PrecedenceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub projects: usize,
    pub networks: usize,
    pub operations: usize,
    pub relationships: usize,
    pub assignments: usize,
    /// Operations accepted with a known overlap after the retry budget ran out.
    pub overlap_warnings: Vec<OverlapWarning>,
    /// Operations whose resource had no active employee.
    pub unstaffed_operations: Vec<i64>,
    /// Table counts read back from the store just before commit.
    pub dataset: DatasetCounts,
}

impl GenerationSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = vec![
            format!("projects={}", self.projects),
            format!("networks={}", self.networks),
            format!("operations={}", self.operations),
            format!("relationships={}", self.relationships),
            format!("assignments={}", self.assignments),
        ];
        if !self.overlap_warnings.is_empty() {
            parts.push(format!("overlaps={}", self.overlap_warnings.len()));
        }
        if !self.unstaffed_operations.is_empty() {
            parts.push(format!("unstaffed={}", self.unstaffed_operations.len()));
        }
        parts.join(", ")
    }
}

/// Drives a full generation run over every project in the store.
pub struct Generator<R: Rng> {
    config: GeneratorConfig,
    rng: R,
    slots: TimeSlotAllocator,
    staffing: AssignmentAllocator,
    precedence: PrecedenceGraphBuilder,
}

impl Generator<StdRng> {
    /// Seeds from `config.seed` when set, otherwise from the OS.
    pub fn from_config(config: GeneratorConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Generator<R> {
    pub fn with_rng(config: GeneratorConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            slots: TimeSlotAllocator::new(config.max_slot_attempts),
            staffing: AssignmentAllocator::new(
                config.assignments_per_operation,
                config.capacity_pct,
            ),
            precedence: PrecedenceGraphBuilder::new(config.max_predecessors, config.buffer_hours),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates networks, operations, relationships and assignments for every
    /// project, then commits the session. Any store failure aborts before commit.
    pub fn run<S: DatasetSession>(
        &mut self,
        mut session: S,
    ) -> Result<GenerationSummary, GenerationError> {
        let projects = session.projects()?;
        if projects.is_empty() {
            return Err(GenerationError::InputMissing("no projects seeded".into()));
        }
        let resources = session.resources()?;
        if resources.is_empty() {
            return Err(GenerationError::InputMissing("no resources seeded".into()));
        }

        info!(
            projects = projects.len(),
            resources = resources.len(),
            "generating networks and operations"
        );

        let mut ctx = GenerationContext::new();
        let mut summary = GenerationSummary::default();
        for (idx, project) in projects.iter().enumerate() {
            info!(project = %project.code, "project {}/{}", idx + 1, projects.len());
            self.generate_project(&mut session, &mut ctx, project, &resources, &mut summary)?;
            summary.projects += 1;
        }

        summary.dataset = session.counts()?;
        session.commit()?;

        let (overlap_warnings, unstaffed_operations) = ctx.into_findings();
        summary.overlap_warnings = overlap_warnings;
        summary.unstaffed_operations = unstaffed_operations;

        info!(summary = %summary.to_cli_summary(), "generation complete");
        Ok(summary)
    }

    fn generate_project<S: DatasetSession>(
        &mut self,
        session: &mut S,
        ctx: &mut GenerationContext,
        project: &Project,
        resources: &[Resource],
        summary: &mut GenerationSummary,
    ) -> Result<(), GenerationError> {
        let bounds = self.config.networks_per_project;
        let network_count = self.rng.random_range(bounds.min..=bounds.max);

        for net_idx in 0..network_count {
            let name = NameCatalogs::network_name(&mut self.rng);
            let network = Network {
                id: ctx.next_network_id(),
                project_id: project.id,
                code: format!("NP-{:02}", net_idx + 1),
                name: name.to_string(),
                description: format!("{name} for {}", project.name),
            };
            session.insert_network(&network)?;
            summary.networks += 1;

            let operations =
                self.generate_operations(session, ctx, project, &network, resources, summary)?;

            let relationships = self.precedence.build(&operations, ctx, &mut self.rng)?;
            for relationship in &relationships {
                session.insert_relationship(relationship)?;
            }
            summary.relationships += relationships.len();

            info!(
                network = network.id,
                code = %network.code,
                operations = operations.len(),
                relationships = relationships.len(),
                "network generated"
            );
        }
        Ok(())
    }

    fn generate_operations<S: DatasetSession>(
        &mut self,
        session: &mut S,
        ctx: &mut GenerationContext,
        project: &Project,
        network: &Network,
        resources: &[Resource],
        summary: &mut GenerationSummary,
    ) -> Result<Vec<Operation>, GenerationError> {
        let bounds = self.config.operations_per_network;
        let count = self.rng.random_range(bounds.min..=bounds.max) as usize;
        let window = project.window();
        let mut operations = Vec::with_capacity(count);

        for sequence in 0..count {
            let resource = &resources[self.rng.random_range(0..resources.len())];
            let hours = self
                .rng
                .random_range(self.config.duration_hours.min..=self.config.duration_hours.max);
            let duration = hours_to_duration(hours).max(Duration::seconds(1));

            let slot =
                self.slots
                    .allocate(&*session, resource.id, &window, duration, &mut self.rng)?;

            let id = ctx.next_operation_id();
            if slot.overlap_accepted {
                warn!(
                    operation = id,
                    resource = resource.id,
                    attempts = slot.attempts,
                    interval = %slot.interval,
                    "no free slot found; accepting overlapping interval"
                );
                ctx.record_overlap(OverlapWarning {
                    operation_id: id,
                    resource_id: resource.id,
                    attempts: slot.attempts,
                });
            } else {
                debug!(
                    operation = id,
                    resource = resource.id,
                    attempts = slot.attempts,
                    "slot allocated"
                );
            }

            let name = NameCatalogs::operation_name(&mut self.rng);
            let status =
                OperationStatus::ALL[self.rng.random_range(0..OperationStatus::ALL.len())];
            let operation = Operation {
                id,
                network_id: network.id,
                resource_id: resource.id,
                code: format!("OP-{:03}", sequence + 1),
                description: format!("{name} as part of {}", network.name),
                name,
                start: slot.interval.start,
                end: slot.interval.end,
                progress_pct: self.rng.random_range(0.0..=100.0),
                status,
                sequence,
            };
            session.insert_operation(&operation)?;

            let assignments = self
                .staffing
                .allocate(&*session, &operation, ctx, &mut self.rng)?;
            if assignments.is_empty() {
                debug!(operation = id, resource = resource.id, "resource has no active staff");
                ctx.record_unstaffed(id);
            }
            for assignment in &assignments {
                session.insert_assignment(assignment)?;
            }
            summary.assignments += assignments.len();
            summary.operations += 1;

            operations.push(operation);
        }
        Ok(operations)
    }
}
