use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Longest operation the generator will place: ten years.
pub const MAX_DURATION_HOURS: f64 = 87_600.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid range for {field}: min {min} is greater than max {max}")]
    InvertedRange {
        field: &'static str,
        min: String,
        max: String,
    },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("cannot read config file: {0}")]
    Io(#[from] io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Inclusive `[min, max]` bound for a sampled quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + PartialOrd + ToString> Bounds<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                field,
                min: self.min.to_string(),
                max: self.max.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub networks_per_project: Bounds<u32>,
    pub operations_per_network: Bounds<u32>,
    pub duration_hours: Bounds<f64>,
    pub max_predecessors: usize,
    pub buffer_hours: Bounds<u32>,
    pub assignments_per_operation: Bounds<usize>,
    pub capacity_pct: Bounds<f64>,
    pub max_slot_attempts: usize,
    /// Fixed seed for the shared RNG. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            networks_per_project: Bounds::new(3, 4),
            operations_per_network: Bounds::new(20, 30),
            duration_hours: Bounds::new(2.0, 48.0),
            max_predecessors: 3,
            buffer_hours: Bounds::new(0, 24),
            assignments_per_operation: Bounds::new(1, 3),
            capacity_pct: Bounds::new(25.0, 100.0),
            max_slot_attempts: 50,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: GeneratorConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.networks_per_project.check("networks_per_project")?;
        self.operations_per_network.check("operations_per_network")?;
        self.duration_hours.check("duration_hours")?;
        self.buffer_hours.check("buffer_hours")?;
        self.assignments_per_operation
            .check("assignments_per_operation")?;
        self.capacity_pct.check("capacity_pct")?;

        if !(self.duration_hours.min.is_finite() && self.duration_hours.max.is_finite())
            || self.duration_hours.min <= 0.0
        {
            return Err(ConfigError::InvalidValue {
                field: "duration_hours",
                reason: "durations must be finite and positive".into(),
            });
        }
        if self.duration_hours.max > MAX_DURATION_HOURS {
            return Err(ConfigError::InvalidValue {
                field: "duration_hours",
                reason: format!("durations may not exceed {MAX_DURATION_HOURS} hours"),
            });
        }
        if !(self.capacity_pct.min > 0.0 && self.capacity_pct.max <= 100.0) {
            return Err(ConfigError::InvalidValue {
                field: "capacity_pct",
                reason: "capacity shares must lie in (0, 100]".into(),
            });
        }
        if self.assignments_per_operation.min == 0 {
            return Err(ConfigError::InvalidValue {
                field: "assignments_per_operation",
                reason: "a staffed operation needs at least one assignment".into(),
            });
        }
        if self.max_predecessors == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_predecessors",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_slot_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_slot_attempts",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
