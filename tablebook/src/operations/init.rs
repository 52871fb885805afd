//! Data directory initialization.
//!
//! Creates the data directory and an empty, schema-initialized database,
//! optionally alongside a commented `config.yaml` listing every setting.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::CONFIG_FILE_NAME;
use crate::database::DATABASE_FILE_NAME;
use crate::error::{Error, Result};
use crate::{Database, DatabaseConfig};

/// Options for [`init_database`].
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Data directory to initialize.
    pub data_dir: PathBuf,
    /// Replace an existing database (its reservations are lost).
    pub overwrite: bool,
    /// Write a default `config.yaml` if none exists.
    pub create_config: bool,
}

impl InitOptions {
    /// Options for `data_dir` that refuse to touch an existing database.
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            overwrite: false,
            create_config: false,
        }
    }

    /// Sets whether an existing database is replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets whether a default configuration file is written.
    #[must_use]
    pub fn with_create_config(mut self, create_config: bool) -> Self {
        self.create_config = create_config;
        self
    }
}

/// What [`init_database`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitResult {
    /// The data directory.
    pub data_dir: PathBuf,
    /// The database file.
    pub database: PathBuf,
    /// Whether the directory had to be created.
    pub data_dir_created: bool,
    /// Whether an existing database was replaced.
    pub database_replaced: bool,
    /// Whether `config.yaml` was written.
    pub config_created: bool,
}

const DEFAULT_CONFIG_TEMPLATE: &str = r"# tablebook configuration
# Every setting is optional; TABLEBOOK_* environment variables override them.

# Minutes between slots listed by availability queries (1-240).
# slot_granularity_minutes: 15

# Step availability slots by `granularity` or by each restaurant's
# `reservation_duration`.
# slot_step: granularity

# Largest party a single reservation may seat.
# max_guests: 20

# Seconds to wait for another writer before giving up.
# maximum_lock_wait_seconds: 5
";

/// Initializes the data directory and its database.
///
/// # Errors
///
/// Returns a validation error if the database exists and `overwrite` is not
/// set, or an I/O or database error if creation fails.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use tablebook::operations::{init_database, InitOptions};
///
/// let options = InitOptions::new(PathBuf::from("/tmp/tablebook")).with_create_config(true);
/// let result = init_database(&options).unwrap();
/// println!("database at {}", result.database.display());
/// ```
pub fn init_database(options: &InitOptions) -> Result<InitResult> {
    let data_dir_created = !options.data_dir.exists();
    if data_dir_created {
        fs::create_dir_all(&options.data_dir)?;
    }

    let database = options.data_dir.join(DATABASE_FILE_NAME);
    let database_replaced = database.exists();
    if database_replaced {
        if !options.overwrite {
            return Err(Error::Validation {
                field: "database".into(),
                message: format!(
                    "database already exists at {}; use --overwrite to replace it",
                    database.display()
                ),
            });
        }
        fs::remove_file(&database)?;
        for suffix in ["-wal", "-shm"] {
            let sidecar = options
                .data_dir
                .join(format!("{DATABASE_FILE_NAME}{suffix}"));
            if sidecar.exists() {
                fs::remove_file(sidecar)?;
            }
        }
    }

    Database::open(DatabaseConfig::new(&database))?.close()?;
    log::info!("initialized database at {}", database.display());

    let mut config_created = false;
    if options.create_config {
        let config_path = options.data_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;
            config_created = true;
        }
    }

    Ok(InitResult {
        data_dir: options.data_dir.clone(),
        database,
        data_dir_created,
        database_replaced,
        config_created,
    })
}
