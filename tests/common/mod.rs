#![allow(dead_code)]

use chrono::{DateTime, Utc};
use netplan_gen::model::{Employee, Facility, Resource};
use netplan_gen::persistence::seed::ProjectSeed;
use netplan_gen::timeline::parse_timestamp;
use netplan_gen::{Bounds, GeneratorConfig, SeedData, SqliteDatasetStore};

pub fn ts(input: &str) -> DateTime<Utc> {
    parse_timestamp(input).unwrap()
}

/// Seed with one facility, `staff.len()` resources where resource `i` has
/// `staff[i]` active employees, and one project per window.
pub fn seed(windows: &[(&str, &str)], staff: &[usize]) -> SeedData {
    let facilities = vec![Facility {
        id: 1,
        code: "F1".into(),
        name: "Depot".into(),
    }];
    let resources = (0..staff.len())
        .map(|i| Resource {
            id: i as i64 + 1,
            facility_id: 1,
            code: format!("R{}", i + 1),
            name: format!("Resource {}", i + 1),
        })
        .collect();

    let mut employees = Vec::new();
    for (i, count) in staff.iter().enumerate() {
        for _ in 0..*count {
            let id = employees.len() as i64 + 1;
            employees.push(Employee {
                id,
                resource_id: Some(i as i64 + 1),
                first_name: format!("Worker{id}"),
                last_name: "Test".into(),
                active: true,
            });
        }
    }

    let projects = windows
        .iter()
        .enumerate()
        .map(|(i, (start, end))| ProjectSeed {
            id: i as i64 + 1,
            code: format!("PRJ-{:03}", i + 1),
            name: format!("Project {}", i + 1),
            planned_start: start.to_string(),
            planned_end: end.to_string(),
        })
        .collect();

    SeedData {
        facilities,
        resources,
        employees,
        projects,
    }
}

pub fn seeded_store(seed: &SeedData) -> SqliteDatasetStore {
    let mut store = SqliteDatasetStore::open_in_memory().unwrap();
    store.load_seed(seed).unwrap();
    store
}

pub fn config(networks: u32, operations: (u32, u32), seed: u64) -> GeneratorConfig {
    GeneratorConfig {
        networks_per_project: Bounds::new(networks, networks),
        operations_per_network: Bounds::new(operations.0, operations.1),
        seed: Some(seed),
        ..GeneratorConfig::default()
    }
}
