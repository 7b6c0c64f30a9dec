mod common;

use chrono::Duration;
use common::{config, seed, seeded_store, ts};
use netplan_gen::audit::overlapping_pairs;
use netplan_gen::config::MAX_DURATION_HOURS;
use netplan_gen::{
    AuditLimits, Bounds, ConfigError, GenerationError, Generator, GeneratorConfig,
    SqliteDatasetStore, StoreError, audit_dataset,
};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use tempfile::NamedTempFile;

fn run(store: &mut SqliteDatasetStore, config: GeneratorConfig) -> netplan_gen::GenerationSummary {
    let mut generator = Generator::from_config(config).unwrap();
    generator.run(store.session().unwrap()).unwrap()
}

#[test]
fn january_project_yields_contained_connected_staffed_network() {
    let seed = seed(&[("2025-01-01T00:00:00Z", "2025-01-31T00:00:00Z")], &[3, 2]);
    let mut store = seeded_store(&seed);

    let summary = run(&mut store, config(1, (20, 30), 2025));
    let snapshot = store.snapshot().unwrap();

    let window_start = ts("2025-01-01T00:00:00Z");
    let window_end = ts("2025-01-31T00:00:00Z");

    assert_eq!(snapshot.networks.len(), 1);
    assert!((20..=30).contains(&snapshot.operations.len()));
    for op in &snapshot.operations {
        assert!(op.start >= window_start && op.end <= window_end, "{}", op.code);
        let hours = (op.end - op.start).num_seconds() as f64 / 3600.0;
        assert!((2.0..=48.0).contains(&hours), "{} lasts {hours}h", op.code);
        assert!((0.0..=100.0).contains(&op.progress_pct));
    }
    assert!(!snapshot.relationships.is_empty());

    let mut staffed: HashMap<i64, usize> = HashMap::new();
    for assignment in &snapshot.assignments {
        *staffed.entry(assignment.operation_id).or_default() += 1;
    }
    for op in &snapshot.operations {
        let count = staffed.get(&op.id).copied().unwrap_or(0);
        assert!((1..=3).contains(&count), "{} has {count} assignments", op.code);
    }

    assert!(summary.unstaffed_operations.is_empty());
    assert_eq!(summary.operations, snapshot.operations.len());
    assert_eq!(summary.relationships, snapshot.relationships.len());
    assert_eq!(summary.assignments, snapshot.assignments.len());
    assert_eq!(summary.dataset.operations, snapshot.operations.len());
}

#[test]
fn generous_windows_produce_a_clean_dataset() {
    let seed = seed(
        &[
            ("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z"),
            ("2025-01-01T00:00:00Z", "2025-12-31T00:00:00Z"),
            ("2026-01-01T00:00:00Z", "2026-12-31T00:00:00Z"),
        ],
        &[2, 3, 1, 2, 4, 2],
    );
    let mut store = seeded_store(&seed);

    let summary = run(&mut store, GeneratorConfig {
        seed: Some(11),
        ..GeneratorConfig::default()
    });
    let snapshot = store.snapshot().unwrap();

    assert_eq!(summary.projects, 3);
    assert!((9..=12).contains(&summary.networks));
    assert!(summary.overlap_warnings.is_empty());
    assert!(overlapping_pairs(&snapshot.operations).is_empty());

    let report = audit_dataset(&snapshot, AuditLimits::default());
    assert!(report.is_clean(), "{}", report.to_cli_summary());
    assert_eq!(report.violation_count(true), 0);

    // Network codes restart per project, ids never do.
    let codes: HashSet<(i64, &str)> = snapshot
        .networks
        .iter()
        .map(|n| (n.project_id, n.code.as_str()))
        .collect();
    assert_eq!(codes.len(), snapshot.networks.len());
    assert!(snapshot.networks.iter().any(|n| n.project_id == 2 && n.code == "NP-01"));

    let ids: Vec<i64> = snapshot.operations.iter().map(|o| o.id).collect();
    let expected: Vec<i64> = (1..=ids.len() as i64).collect();
    assert_eq!(ids, expected);
    let rel_ids: HashSet<i64> = snapshot.relationships.iter().map(|r| r.id).collect();
    assert_eq!(rel_ids.len(), snapshot.relationships.len());
    let asg_ids: HashSet<i64> = snapshot.assignments.iter().map(|a| a.id).collect();
    assert_eq!(asg_ids.len(), snapshot.assignments.len());
}

#[test]
fn assignments_come_from_the_operation_resource() {
    let seed = seed(&[("2025-01-01", "2025-12-31")], &[1, 4, 2]);
    let mut store = seeded_store(&seed);
    run(&mut store, config(3, (20, 30), 5));
    let snapshot = store.snapshot().unwrap();

    let employee_resource: HashMap<i64, Option<i64>> = snapshot
        .employees
        .iter()
        .map(|e| (e.id, e.resource_id))
        .collect();
    let operation_resource: HashMap<i64, i64> = snapshot
        .operations
        .iter()
        .map(|o| (o.id, o.resource_id))
        .collect();
    for assignment in &snapshot.assignments {
        assert_eq!(
            employee_resource[&assignment.employee_id],
            Some(operation_resource[&assignment.operation_id])
        );
        assert!(assignment.capacity_pct > 0.0 && assignment.capacity_pct <= 100.0);
    }
}

#[test]
fn overconstrained_resource_falls_back_to_overlapping_slots() {
    // Every candidate starts in the first 4h and lasts 20h, so any two collide.
    let seed = seed(&[("2025-01-01T00:00:00Z", "2025-01-02T00:00:00Z")], &[1]);
    let mut store = seeded_store(&seed);
    let config = GeneratorConfig {
        duration_hours: Bounds::new(20.0, 20.0),
        max_slot_attempts: 5,
        ..config(1, (5, 5), 3)
    };

    let summary = run(&mut store, config);
    let snapshot = store.snapshot().unwrap();

    assert_eq!(summary.operations, 5);
    assert_eq!(summary.overlap_warnings.len(), 4);
    for warning in &summary.overlap_warnings {
        assert_eq!(warning.attempts, 5);
        assert_eq!(warning.resource_id, 1);
    }
    assert!(!overlapping_pairs(&snapshot.operations).is_empty());
    for op in &snapshot.operations {
        assert!(op.start >= ts("2025-01-01T00:00:00Z"));
        assert_eq!(op.end - op.start, Duration::hours(20));
    }
    let report = audit_dataset(&snapshot, AuditLimits::default());
    assert!(report.is_clean());
    assert!(report.violation_count(true) > 0);
}

#[test]
fn short_window_nudge_keeps_start_inside_project() {
    let seed = seed(&[("2025-01-01T00:00:00Z", "2025-01-01T12:00:00Z")], &[2, 2]);
    let mut store = seeded_store(&seed);
    let config = GeneratorConfig {
        duration_hours: Bounds::new(20.0, 20.0),
        ..config(1, (4, 4), 8)
    };

    run(&mut store, config);
    let snapshot = store.snapshot().unwrap();

    for op in &snapshot.operations {
        assert!(op.start >= ts("2025-01-01T00:00:00Z"));
        assert!(op.start <= ts("2025-01-02T00:00:00Z"));
        assert_eq!(op.end - op.start, Duration::hours(20));
    }
    let report = audit_dataset(&snapshot, AuditLimits::default());
    assert_eq!(report.ends_after_window.len(), snapshot.operations.len());
    assert!(report.starts_before_window.is_empty());
}

#[test]
fn resource_without_staff_leaves_operations_unassigned() {
    let seed = seed(&[("2025-01-01", "2025-12-31")], &[0]);
    let mut store = seeded_store(&seed);

    let summary = run(&mut store, config(1, (20, 20), 4));

    assert_eq!(summary.assignments, 0);
    assert_eq!(summary.unstaffed_operations.len(), 20);
    assert_eq!(store.counts().unwrap().assignments, 0);
}

#[test]
fn missing_projects_abort_before_generation() {
    let seed = seed(&[], &[1]);
    let mut store = seeded_store(&seed);
    let mut generator = Generator::from_config(config(1, (2, 2), 1)).unwrap();

    let err = generator.run(store.session().unwrap()).unwrap_err();

    assert!(matches!(err, GenerationError::InputMissing(_)));
    assert_eq!(store.counts().unwrap().networks, 0);
}

#[test]
fn missing_resources_abort_before_generation() {
    let seed = seed(&[("2025-01-01", "2025-02-01")], &[]);
    let mut store = seeded_store(&seed);
    let mut generator = Generator::from_config(config(1, (2, 2), 1)).unwrap();

    let err = generator.run(store.session().unwrap()).unwrap_err();

    assert!(matches!(err, GenerationError::InputMissing(_)));
}

#[test]
fn constraint_violation_rolls_back_the_run() {
    let seed = seed(&[("2025-01-01", "2025-12-31")], &[2]);
    let mut store = seeded_store(&seed);
    store
        .connection()
        .execute(
            "INSERT INTO networks (id, project_id, code, name) VALUES (1, 1, 'NP-99', 'Existing')",
            [],
        )
        .unwrap();
    let mut generator = Generator::from_config(config(2, (3, 3), 1)).unwrap();

    let err = generator.run(store.session().unwrap()).unwrap_err();

    assert!(matches!(
        err,
        GenerationError::Store(StoreError::ConstraintViolation(_))
    ));
    let counts = store.counts().unwrap();
    assert_eq!(counts.networks, 1);
    assert_eq!(counts.operations, 0);
}

#[test]
fn fixed_seed_reproduces_the_dataset() {
    let seed = seed(&[("2025-01-01", "2025-06-30")], &[2, 3]);
    let mut first = seeded_store(&seed);
    let mut second = seeded_store(&seed);

    run(&mut first, config(2, (10, 15), 99));
    run(&mut second, config(2, (10, 15), 99));

    let a = first.snapshot().unwrap();
    let b = second.snapshot().unwrap();
    assert_eq!(a.operations, b.operations);
    assert_eq!(a.relationships, b.relationships);
    assert_eq!(a.assignments, b.assignments);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = GeneratorConfig {
        networks_per_project: Bounds::new(4, 3),
        ..GeneratorConfig::default()
    };
    assert!(Generator::from_config(config).is_err());
}

#[test]
fn durations_beyond_the_calendar_are_rejected_before_running() {
    let config = GeneratorConfig {
        duration_hours: Bounds::new(1.0, 1.0e10),
        ..config(1, (3, 3), 5)
    };
    assert!(matches!(
        Generator::from_config(config),
        Err(ConfigError::InvalidValue {
            field: "duration_hours",
            ..
        })
    ));
}

#[test]
fn longest_allowed_duration_still_generates() {
    let seed = seed(&[("2025-01-01", "2025-02-01")], &[1]);
    let mut store = seeded_store(&seed);
    let config = GeneratorConfig {
        duration_hours: Bounds::new(MAX_DURATION_HOURS, MAX_DURATION_HOURS),
        ..config(1, (2, 2), 5)
    };

    let summary = run(&mut store, config);

    assert_eq!(summary.operations, 2);
    for op in &store.snapshot().unwrap().operations {
        assert!(op.start >= ts("2025-01-01T00:00:00Z"));
        assert!(op.start <= ts("2025-01-02T00:00:00Z"));
    }
}

#[test]
fn fractional_second_windows_from_sql_seeds_stay_inside_the_project() {
    let mut script = NamedTempFile::new().unwrap();
    writeln!(
        script,
        "INSERT INTO facilities (id, code, name) VALUES (1, 'F1', 'Depot');
         INSERT INTO resources (id, facility_id, code, name) VALUES (1, 1, 'R1', 'Crane');
         INSERT INTO employees (id, resource_id, first_name, last_name, active)
             VALUES (1, 1, 'Ada', 'Byron', 1);
         INSERT INTO projects (id, code, name, planned_start, planned_end)
             VALUES (1, 'P1', 'Refit', '2025-01-01T00:00:00.900Z', '2025-01-01T10:00:01.400Z');"
    )
    .unwrap();
    let mut store = SqliteDatasetStore::open_in_memory().unwrap();
    store.load_seed_sql(script.path()).unwrap();

    let config = GeneratorConfig {
        duration_hours: Bounds::new(9.0, 9.0),
        ..config(1, (10, 10), 7)
    };
    run(&mut store, config);

    let snapshot = store.snapshot().unwrap();
    let project = &snapshot.projects[0];
    assert_eq!(snapshot.operations.len(), 10);
    for op in &snapshot.operations {
        assert!(op.start >= project.planned_start, "{} starts {}", op.code, op.start);
        assert!(op.end <= project.planned_end, "{} ends {}", op.code, op.end);
    }
    let report = audit_dataset(&snapshot, AuditLimits::default());
    assert!(report.starts_before_window.is_empty());
    assert!(report.ends_after_window.is_empty());
}
