//! BDD tests for the runner: loading, verification, batch runs.
//!
//! These tests exercise real files on disk:
//! - Loading a trip export and verifying it end to end
//! - Discovering exports by prefix inside directories
//! - Parallel batch verification with per-file failures
//! - Config files driving discovery and currency

use std::fs;
use std::path::{Path, PathBuf};

use crewledger_runner::{
    discover_trip_files, load_trip, verify_all, verify_file, verify_trip, ExpenseStatus,
    RunnerConfig,
};

const WEEKEND_TRIP: &str = r#"{
    "trip": { "name": "Weekend in Lyon", "currency": "EUR" },
    "participants": [
        { "id": "alice", "name": "Alice" },
        { "id": "bob", "name": "Bob" },
        { "id": "charlie", "name": "Charlie" }
    ],
    "expenses": [
        { "id": "e1", "amount": 15000, "paidBy": "alice", "description": "Dinner", "date": "2024-03-08T20:00:00Z" },
        { "id": "e2", "amount": 100, "paidBy": "bob", "description": "Coffee", "date": "2024-03-09" },
        { "id": "e3", "amount": 4000, "paidBy": "charlie", "description": "Museum", "date": "2024-03-09" }
    ],
    "expenseSplits": [
        { "expenseId": "e1", "participantId": "alice", "shareType": "equal" },
        { "expenseId": "e1", "participantId": "bob", "shareType": "equal" },
        { "expenseId": "e1", "participantId": "charlie", "shareType": "equal" },
        { "expenseId": "e2", "participantId": "alice", "shareType": "weight", "share": 1 },
        { "expenseId": "e2", "participantId": "bob", "shareType": "weight", "share": 1 },
        { "expenseId": "e2", "participantId": "charlie", "shareType": "weight", "share": 1 },
        { "expenseId": "e3", "participantId": "alice", "shareType": "percentage", "share": 70 },
        { "expenseId": "e3", "participantId": "bob", "shareType": "percentage", "share": 20 }
    ]
}"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn bdd_scenario_verify_trip_file_end_to_end() {
    // GIVEN a trip export on disk with one broken expense (percentages sum to 90)
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "crewledger-lyon.json", WEEKEND_TRIP);

    // WHEN the file is loaded and verified
    let trip = load_trip(&path, "USD").unwrap();
    let report = verify_trip(&trip).unwrap();

    // THEN the trip header wins over the default currency
    assert_eq!(report.trip_name, "Weekend in Lyon");
    assert_eq!(report.currency, "EUR");

    // AND the museum expense is flagged, the others pass
    let statuses: Vec<&ExpenseStatus> = report.rows.iter().map(|r| &r.status).collect();
    assert_eq!(statuses[0], &ExpenseStatus::Ok);
    assert_eq!(statuses[1], &ExpenseStatus::Ok);
    assert!(matches!(statuses[2], ExpenseStatus::Invalid(reason) if reason.contains("sum to 100")));

    // AND the plan covers dinner and coffee only:
    // alice +10000 - 34, bob -5000 + 67, charlie -5033
    let nets: Vec<i64> = report
        .settlement
        .balances
        .iter()
        .map(|b| b.net_position)
        .collect();
    assert_eq!(nets, vec![9_966, -4_933, -5_033]);
    assert_eq!(report.total_trip_cost, 19_100);
}

#[test]
fn bdd_scenario_discover_exports_by_prefix() {
    // GIVEN a directory with two exports, one unrelated JSON file and a text file
    let dir = tempfile::tempdir().unwrap();
    let b = write(dir.path(), "crewledger-b.json", WEEKEND_TRIP);
    let a = write(dir.path(), "crewledger-a.json", WEEKEND_TRIP);
    write(dir.path(), "settings.json", "{}");
    write(dir.path(), "crewledger-notes.txt", "notes");

    // WHEN discovering from the directory and one explicit duplicate path
    let inputs = vec![dir.path().to_path_buf(), b.clone()];
    let found = discover_trip_files(&inputs, "crewledger-").unwrap();

    // THEN only the exports are returned, deduplicated and sorted
    assert_eq!(found, vec![a, b]);
}

#[test]
fn bdd_scenario_batch_reports_each_file() {
    // GIVEN one valid export and one malformed export
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "crewledger-good.json", WEEKEND_TRIP);
    let bad = write(dir.path(), "crewledger-bad.json", "{ \"expenses\": [ oops ] }");
    let paths = discover_trip_files(&[dir.path().to_path_buf()], "crewledger-").unwrap();

    // WHEN verifying the batch
    let items = verify_all(&paths, &RunnerConfig::default());

    // THEN results keep sorted path order and failures stay per-file
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].path, bad);
    assert!(!items[0].is_ok());
    assert_eq!(items[1].path, good);
    assert!(items[1].is_ok());
}

#[test]
fn bdd_scenario_config_file_changes_defaults() {
    // GIVEN a config with a custom prefix and currency
    let dir = tempfile::tempdir().unwrap();
    let config_path = write(
        dir.path(),
        "crewledger.toml",
        "[currency]\ncode = \"GBP\"\nsymbol = \"£\"\n\n[discovery]\nfile_prefix = \"trip-\"\n",
    );
    let config = RunnerConfig::from_file(&config_path).unwrap();

    // AND an export without a trip header
    let export = write(
        dir.path(),
        "trip-cardiff.json",
        r#"{ "participants": [{ "id": "a", "name": "Ann" }], "expenses": [{ "id": "x", "amount": 500, "paidBy": "a" }] }"#,
    );
    write(dir.path(), "crewledger-ignored.json", WEEKEND_TRIP);

    // WHEN discovering and verifying with that config
    let found = discover_trip_files(&[dir.path().to_path_buf()], &config.discovery.file_prefix).unwrap();
    let report = verify_file(&export, &config).unwrap();

    // THEN only the prefixed file is found and the config currency applies
    assert_eq!(found, vec![export]);
    assert_eq!(report.currency, "GBP");
    assert_eq!(report.trip_name, "trip-cardiff");
    assert_eq!(report.rows[0].status, ExpenseStatus::Unsplit);
    assert!(report.settlement.is_settled());
}

#[test]
fn bdd_scenario_missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("crewledger-missing.json");

    let err = verify_file(&missing, &RunnerConfig::default()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load"));
}
