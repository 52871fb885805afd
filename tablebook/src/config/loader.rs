//! Configuration file loading.
//!
//! The only configuration file is `config.yaml` inside the data directory.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the configuration document inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Loads configuration documents from disk.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `{data_dir}/config.yaml`, or the default data directory's file.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_user_config(data_dir: Option<&Path>) -> Result<Option<Config>> {
        let config_path = Self::config_path(data_dir)?;
        if !config_path.exists() {
            return Ok(None);
        }
        Self::load_file(&config_path).map(Some)
    }

    /// Path of the configuration file for the given data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory is given and the home directory
    /// cannot be determined.
    pub fn config_path(data_dir: Option<&Path>) -> Result<PathBuf> {
        match data_dir {
            Some(dir) => Ok(dir.join(CONFIG_FILE_NAME)),
            None => Ok(crate::database::default_data_dir()?.join(CONFIG_FILE_NAME)),
        }
    }

    /// Load and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)?;

        // A document holding only comments has no mapping to deserialize.
        let is_blank = contents
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#'));
        if is_blank {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&contents).map_err(|e| Error::Validation {
            field: format!("{}", path.display()),
            message: format!("Invalid YAML: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load_file(Path::new("/nonexistent/path/config.yaml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.yaml");
        fs::write(&config_path, "invalid: yaml: syntax:").unwrap();

        assert!(ConfigLoader::load_file(&config_path).is_err());
    }

    #[test]
    fn test_load_user_config_from_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "max_guests: 10\nslot_step: reservation_duration\n",
        )
        .unwrap();

        let config = ConfigLoader::load_user_config(Some(temp_dir.path()))
            .unwrap()
            .unwrap();
        assert_eq!(config.max_guests, Some(10));
    }

    #[test]
    fn test_missing_user_config_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(ConfigLoader::load_user_config(Some(temp_dir.path()))
            .unwrap()
            .is_none());
    }
}
