//! Integration tests for error envelopes and exit codes.
//!
//! - Exit code 0: Success
//! - Exit code 1: Request rejected (validation, closing time, no availability)
//! - Exit code 3: No database found
//! - Exit code 4: Missing or unknown API key
//! - Exit code 8: Resource not found

mod common;

use common::{error_of, TestEnv};
use predicates::prelude::*;

#[test]
fn test_success_exit_code() {
    let env = TestEnv::with_catalog();

    env.authed().arg("list").assert().code(0);
    env.authed()
        .args(["availability", "--datetime", "2030-03-04T12:00:00Z", "--guests", "2"])
        .assert()
        .code(0);
}

#[test]
fn test_missing_api_key() {
    let env = TestEnv::with_catalog();

    let output = env.command().arg("list").output().unwrap();

    assert_eq!(output.status.code(), Some(4));
    let envelope = error_of(&output);
    assert_eq!(envelope["error"], "Unauthorized");
    assert_eq!(envelope["message"], "Invalid or missing API key");
}

#[test]
fn test_unknown_api_key() {
    let env = TestEnv::with_catalog();

    env.command()
        .args(["--api-key", "stolen", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unauthorized"));
}

#[test]
fn test_bearer_prefix_is_accepted() {
    let env = TestEnv::with_catalog();

    env.command()
        .args(["--api-key", "Bearer bistro-key", "list"])
        .assert()
        .success();
}

#[test]
fn test_missing_database() {
    let env = TestEnv::new();

    env.command()
        .args(["--api-key", "bistro-key", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("tablebook init"));
    assert!(!env.data_dir.join("tablebook.db").exists());
}

#[test]
fn test_unknown_table_is_not_found() {
    let env = TestEnv::with_catalog();

    let output = env
        .authed()
        .args(["gaps", "--table", "404", "--date", "2030-03-04"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(8));
    assert_eq!(error_of(&output)["message"], "table 404 not found");
}

#[test]
fn test_malformed_query_values() {
    let env = TestEnv::with_catalog();

    let output = env
        .authed()
        .args(["slot", "--date", "04/03/2030", "--time", "19:00", "--guests", "2"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(error_of(&output)["error"], "Bad Request");

    let output = env
        .authed()
        .args(["availability", "--datetime", "2030-03-04T12:00:00Z", "--guests", "21"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        error_of(&output)["details"][0],
        "Guest count cannot exceed 20"
    );
}

#[test]
fn test_config_max_guests_is_honoured() {
    let env = TestEnv::with_catalog();
    std::fs::write(env.data_dir.join("config.yaml"), "max_guests: 4\n").unwrap();

    let output = env.book("2030-03-04T19:00:00Z", 5, "+15550100");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        error_of(&output)["details"][0],
        "Guest count cannot exceed 4"
    );
}

#[test]
fn test_invalid_config_file() {
    let env = TestEnv::with_catalog();
    std::fs::write(env.data_dir.join("config.yaml"), "slot_granularity_minutes: 0\n").unwrap();

    env.authed()
        .arg("list")
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_conflicting_client_flags_are_usage_errors() {
    let env = TestEnv::with_catalog();

    env.authed()
        .args(["book", "--start", "2030-03-04T19:00:00Z", "--guests", "2"])
        .args(["--client-id", "1", "--name", "Ada", "--phone", "+15550100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
