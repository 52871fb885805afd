//! Database configuration and connection parameters.
//!
//! This module provides configuration types for database connections,
//! including path resolution and connection parameters.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// File name of the database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "tablebook.db";

/// Configuration for database connections.
///
/// # Examples
///
/// ```
/// use tablebook::database::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("/tmp/tablebook.db")
///     .with_busy_timeout(Duration::from_millis(10000));
/// assert_eq!(config.busy_timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database file.
    pub path: PathBuf,
    /// Busy timeout for database lock contention.
    pub busy_timeout: Duration,
    /// Whether to automatically create the database if it doesn't exist.
    pub auto_create: bool,
    /// Whether to open the database in read-only mode.
    pub read_only: bool,
}

impl DatabaseConfig {
    /// Creates a new database configuration with default settings.
    ///
    /// Default settings:
    /// - `busy_timeout`: 5000ms
    /// - `auto_create`: true
    /// - `read_only`: false
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(5000),
            auto_create: true,
            read_only: false,
        }
    }

    /// Sets the busy timeout duration.
    ///
    /// The busy timeout determines how long the connection waits on a
    /// locked database before returning an error.
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Configures the database to be opened in read-only mode.
    ///
    /// When read-only is enabled, `auto_create` is automatically disabled.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.auto_create = false;
        self
    }
}

/// Returns the default data directory, `~/.tablebook`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_data_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|home| home.join(".tablebook"))
        .ok_or_else(|| Error::Validation {
            field: "home_directory".into(),
            message: "Cannot determine home directory".into(),
        })
}

/// Resolves the data directory from an explicit override, the
/// `TABLEBOOK_DATA_DIR` environment variable, or the default.
///
/// # Errors
///
/// Returns an error if no override is set and the home directory cannot be
/// determined.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    match std::env::var("TABLEBOOK_DATA_DIR") {
        Ok(dir) => Ok(PathBuf::from(dir)),
        Err(_) => default_data_dir(),
    }
}

/// Resolves the database path inside the resolved data directory.
///
/// # Errors
///
/// See [`resolve_data_dir`].
pub fn resolve_database_path(explicit: Option<&Path>) -> Result<PathBuf> {
    Ok(resolve_data_dir(explicit)?.join(DATABASE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_new() {
        let config = DatabaseConfig::new("/tmp/test.db");
        assert_eq!(config.path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(5000));
        assert!(config.auto_create);
        assert!(!config.read_only);
    }

    #[test]
    fn test_config_read_only() {
        let config = DatabaseConfig::new("/tmp/test.db").read_only();
        assert!(config.read_only);
        assert!(!config.auto_create);
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let path = resolve_database_path(Some(Path::new("/srv/tables"))).unwrap();
        assert_eq!(path, PathBuf::from("/srv/tables/tablebook.db"));
    }

    #[test]
    #[serial]
    fn test_env_data_dir() {
        std::env::set_var("TABLEBOOK_DATA_DIR", "/custom/data");
        let path = resolve_database_path(None).unwrap();
        std::env::remove_var("TABLEBOOK_DATA_DIR");
        assert_eq!(path, PathBuf::from("/custom/data/tablebook.db"));
    }
}
