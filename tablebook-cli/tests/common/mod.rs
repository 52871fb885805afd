//! Common test utilities for CLI integration tests.
//!
//! Each [`TestEnv`] owns an isolated data directory. Commands run with
//! `--quiet` so stderr carries only the JSON error envelope.

use assert_cmd::Command;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// API key of the restaurant in [`CATALOG`].
pub const API_KEY: &str = "bistro-key";

/// One restaurant with tables of 2, 4 and 6 seats, open 12:00-15:00 and
/// 18:00-23:00 every day, 90 minute reservations and a 15 minute buffer.
pub const CATALOG: &str = r#"
restaurants:
  - name: Bistro
    api_key: bistro-key
    reservation_duration: 90
    buffer_time: 15
    zones: [terrace]
    tables:
      - capacity: 2
      - capacity: 4
        zone: terrace
      - capacity: 6
    weekly_schedule:
      - { day_of_week: 0, opening_time: "12:00", closing_time: "15:00" }
      - { day_of_week: 0, opening_time: "18:00", closing_time: "23:00" }
      - { day_of_week: 1, opening_time: "12:00", closing_time: "15:00" }
      - { day_of_week: 1, opening_time: "18:00", closing_time: "23:00" }
      - { day_of_week: 2, opening_time: "12:00", closing_time: "15:00" }
      - { day_of_week: 2, opening_time: "18:00", closing_time: "23:00" }
      - { day_of_week: 3, opening_time: "12:00", closing_time: "15:00" }
      - { day_of_week: 3, opening_time: "18:00", closing_time: "23:00" }
      - { day_of_week: 4, opening_time: "12:00", closing_time: "15:00" }
      - { day_of_week: 4, opening_time: "18:00", closing_time: "23:00" }
      - { day_of_week: 5, opening_time: "12:00", closing_time: "15:00" }
      - { day_of_week: 5, opening_time: "18:00", closing_time: "23:00" }
      - { day_of_week: 6, opening_time: "12:00", closing_time: "15:00" }
      - { day_of_week: 6, opening_time: "18:00", closing_time: "23:00" }
    exceptions:
      - { date: "2030-12-25", description: Christmas }
"#;

/// Test environment with isolated data directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Path to the tablebook data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment; the data directory is not created.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let data_dir = temp_path.join("tablebook-data");

        Self {
            temp_dir,
            temp_path,
            data_dir,
        }
    }

    /// A test environment with [`CATALOG`] imported.
    pub fn with_catalog() -> Self {
        let env = Self::new();
        env.import(CATALOG);
        env
    }

    /// Get a bare command builder without pre-configured flags.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("tablebook").expect("Failed to find tablebook binary");
        cmd.env_remove("TABLEBOOK_DATA_DIR")
            .env_remove("TABLEBOOK_API_KEY")
            .env_remove("TABLEBOOK_LOG_MODE");
        cmd
    }

    /// Command with `--quiet` and the data directory pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--quiet").arg("--data-dir").arg(&self.data_dir);
        cmd
    }

    /// Command that also authenticates as the catalog restaurant.
    pub fn authed(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("--api-key").arg(API_KEY);
        cmd
    }

    /// Write `yaml` to a file and import it.
    pub fn import(&self, yaml: &str) -> Value {
        let path = self.temp_path.join("catalog.yaml");
        std::fs::write(&path, yaml).expect("Failed to write catalog");
        let mut cmd = self.command();
        cmd.arg("import").arg(&path);
        success_data(&mut cmd)
    }

    /// Book `guests` at `start` for a client identified by phone.
    pub fn book(&self, start: &str, guests: u32, phone: &str) -> std::process::Output {
        self.authed()
            .args(["book", "--start", start, "--guests", &guests.to_string()])
            .args(["--name", "Ada Lovelace", "--phone", phone])
            .output()
            .expect("Failed to run book")
    }
}

/// Run `cmd`, assert success and return the `data` field of its output.
pub fn success_data(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("Failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(json["success"], true);
    json["data"].clone()
}

/// The data of a successful output.
pub fn data_of(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    json["data"].clone()
}

/// The JSON error envelope printed on stderr.
pub fn error_of(output: &std::process::Output) -> Value {
    assert!(!output.status.success(), "command unexpectedly succeeded");
    serde_json::from_slice(&output.stderr).expect("stderr is not JSON")
}
