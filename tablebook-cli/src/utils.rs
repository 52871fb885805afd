//! Utility functions for CLI operations.
//!
//! Data directory and configuration resolution, database access, caller
//! authentication and JSON output shared by the commands.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tablebook::api::Success;
use tablebook::database::{resolve_data_dir, resolve_database_path};
use tablebook::identity::authenticate;
use tablebook::model::RestaurantId;
use tablebook::{Config, ConfigBuilder, Database, DatabaseConfig};

use crate::error::CliError;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the busy timeout (in seconds).
    pub busy_timeout: Option<u32>,

    /// API key identifying the restaurant.
    pub api_key: Option<String>,
}

/// The data directory: `--data-dir`, then `TABLEBOOK_DATA_DIR`, then
/// `~/.tablebook`.
pub fn data_dir(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    resolve_data_dir(global.data_dir.as_deref()).map_err(|e| CliError::Config(e.to_string()))
}

/// Load configuration from the data directory's `config.yaml` and the
/// environment.
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    ConfigBuilder::new()
        .with_data_dir(data_dir(global)?)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Open the database in the data directory.
///
/// # Errors
///
/// Returns `NoDataDirectory` unless the database already exists; only
/// `init` and `import` create it.
pub fn open_database(global: &GlobalOptions, config: &Config) -> Result<Database, CliError> {
    let db_path = resolve_database_path(Some(&data_dir(global)?))?;
    if !db_path.exists() {
        return Err(CliError::NoDataDirectory);
    }
    Database::open(database_config(global, config, db_path)).map_err(CliError::from)
}

/// Database settings for `db_path` honouring `--busy-timeout` and the
/// configured lock wait.
pub fn database_config(
    global: &GlobalOptions,
    config: &Config,
    db_path: PathBuf,
) -> DatabaseConfig {
    let seconds = global
        .busy_timeout
        .map_or_else(|| config.lock_wait_seconds(), u64::from);
    DatabaseConfig::new(db_path).with_busy_timeout(Duration::from_secs(seconds))
}

/// Resolve `--api-key` to the restaurant it belongs to.
pub fn authenticate_caller(global: &GlobalOptions, db: &Database) -> Result<RestaurantId, CliError> {
    let key = global.api_key.as_deref().ok_or(CliError::Unauthorized)?;
    authenticate(db.connection(), key)?.ok_or(CliError::Unauthorized)
}

/// Print `data` wrapped in the success envelope as pretty JSON on stdout.
pub fn print_success<T: Serialize>(data: T) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &Success::new(data))?;
    writeln!(handle)?;
    Ok(())
}
