use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn demo_seed() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/seed.json")
}

#[allow(deprecated)]
fn netplan() -> Command {
    Command::cargo_bin("netplan").unwrap()
}

#[test]
fn generate_then_audit_demo_dataset() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("demo.db");
    let summary = dir.path().join("summary.json");

    netplan()
        .args(["generate", "--seed", "7", "--db"])
        .arg(&db)
        .arg("--seed-data")
        .arg(demo_seed())
        .arg("--summary-json")
        .arg(&summary)
        .assert()
        .success()
        .stdout(predicate::str::contains("Projects           : 3"))
        .stdout(predicate::str::contains("Operations"))
        .stdout(predicate::str::contains("projects=3, networks="));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(written["projects"], 3);
    assert!(written["operations"].as_u64().unwrap() >= 3 * 3 * 20);

    netplan()
        .args(["audit", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dataset OK"));
}

#[test]
fn regenerating_with_seed_data_replaces_the_database() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("demo.db");

    for _ in 0..2 {
        netplan()
            .args(["generate", "--seed", "3", "--db"])
            .arg(&db)
            .arg("--seed-data")
            .arg(demo_seed())
            .assert()
            .success()
            .stdout(predicate::str::contains("Facilities         : 2"));
    }
}

#[test]
fn generate_without_database_or_seed_fails() {
    let dir = TempDir::new().unwrap();
    netplan()
        .args(["generate", "--db"])
        .arg(dir.path().join("missing.db"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn unsupported_seed_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("seed.yaml");
    std::fs::write(&seed, "projects: []").unwrap();

    netplan()
        .args(["generate", "--db"])
        .arg(dir.path().join("x.db"))
        .arg("--seed-data")
        .arg(&seed)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected .json or .sql"));
}

#[test]
fn unknown_log_format_is_rejected() {
    netplan()
        .args(["--log-format", "xml", "audit", "--db", "nowhere.db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown log format"));
}
