use super::{StoreError, StoreResult};
use crate::model::{Employee, Facility, Resource};
use crate::timeline::parse_timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// Project shell as it appears in seed files. Planned dates stay textual until
/// validated so several timestamp shapes can be accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSeed {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub planned_start: String,
    pub planned_end: String,
}

/// Static inputs for a generation run: facilities, resources, employees and
/// project shells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub projects: Vec<ProjectSeed>,
}

impl SeedData {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let file = File::open(path)?;
        let seed: SeedData = serde_json::from_reader(file)?;
        seed.validate()?;
        Ok(seed)
    }

    /// Checks referential integrity and planned dates before anything is written.
    pub fn validate(&self) -> StoreResult<()> {
        let facility_ids = unique_ids("facility", self.facilities.iter().map(|f| f.id))?;
        let resource_ids = unique_ids("resource", self.resources.iter().map(|r| r.id))?;
        unique_ids("employee", self.employees.iter().map(|e| e.id))?;
        unique_ids("project", self.projects.iter().map(|p| p.id))?;

        for resource in &self.resources {
            if !facility_ids.contains(&resource.facility_id) {
                return Err(StoreError::InvalidData(format!(
                    "resource {} references unknown facility {}",
                    resource.id, resource.facility_id
                )));
            }
        }
        for employee in &self.employees {
            if let Some(resource_id) = employee.resource_id {
                if !resource_ids.contains(&resource_id) {
                    return Err(StoreError::InvalidData(format!(
                        "employee {} references unknown resource {}",
                        employee.id, resource_id
                    )));
                }
            }
        }
        for project in &self.projects {
            for (label, value) in [
                ("planned_start", &project.planned_start),
                ("planned_end", &project.planned_end),
            ] {
                if parse_timestamp(value).is_none() {
                    return Err(StoreError::InvalidData(format!(
                        "project {} has unparseable {label} '{value}'",
                        project.code
                    )));
                }
            }
        }
        Ok(())
    }
}

fn unique_ids(kind: &str, ids: impl Iterator<Item = i64>) -> StoreResult<HashSet<i64>> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(StoreError::InvalidData(format!("duplicate {kind} id {id}")));
        }
    }
    Ok(seen)
}
