//! Integration tests for global CLI options and their environment
//! variables.

mod common;

use common::{success_data, TestEnv, API_KEY};
use predicates::prelude::*;

#[test]
fn test_data_dir_from_environment() {
    let env = TestEnv::with_catalog();

    env.command_bare()
        .env("TABLEBOOK_DATA_DIR", &env.data_dir)
        .args(["--quiet", "--api-key", API_KEY, "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"));
}

#[test]
fn test_api_key_from_environment() {
    let env = TestEnv::with_catalog();

    let data = success_data(env.command().env("TABLEBOOK_API_KEY", API_KEY).arg("list"));
    assert!(data.as_array().unwrap().is_empty());
}

#[test]
fn test_flag_overrides_environment() {
    let env = TestEnv::with_catalog();
    let elsewhere = env.temp_path.join("elsewhere");

    // The flag points at the imported data directory; the variable does not.
    env.command_bare()
        .env("TABLEBOOK_DATA_DIR", &elsewhere)
        .arg("--data-dir")
        .arg(&env.data_dir)
        .args(["--quiet", "--api-key", API_KEY, "list"])
        .assert()
        .success();
}

#[test]
fn test_busy_timeout_flag_is_accepted() {
    let env = TestEnv::with_catalog();

    env.authed()
        .args(["--busy-timeout", "1", "list"])
        .assert()
        .success();
}

#[test]
fn test_verbose_logs_to_stderr() {
    let env = TestEnv::with_catalog();

    env.command_bare()
        .arg("--data-dir")
        .arg(&env.data_dir)
        .args(["--verbose", "--api-key", API_KEY, "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"));
}

#[test]
fn test_quiet_suppresses_warnings() {
    let env = TestEnv::with_catalog();

    let output = env
        .command()
        .args(["--api-key", "unknown", "list"])
        .output()
        .unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(!stderr.contains("WARN"));
}

#[test]
fn test_completions_generation() {
    let env = TestEnv::new();

    env.command()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tablebook"));
}

#[test]
fn test_version_flag() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tablebook"));
}
