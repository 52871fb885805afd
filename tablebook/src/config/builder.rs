//! Layered configuration assembly.

use std::path::{Path, PathBuf};

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::schema::Config;
use crate::config::validator::ConfigValidator;
use crate::error::Result;

/// Builds a [`Config`] from defaults, the data-directory file, the
/// environment and programmatic overrides, in increasing precedence.
///
/// # Examples
///
/// ```
/// use tablebook::config::{Config, ConfigBuilder};
///
/// let config = ConfigBuilder::new()
///     .skip_files()
///     .skip_env()
///     .with_config(Config { max_guests: Some(8), ..Config::default() })
///     .build()
///     .unwrap();
/// assert_eq!(config.booking_policy().max_guests, 8);
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    data_dir: Option<PathBuf>,
    overrides: Option<Config>,
    skip_files: bool,
    skip_env: bool,
}

impl ConfigBuilder {
    /// Start a builder with every source enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `config.yaml` from this data directory instead of the default.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(data_dir.as_ref().to_path_buf());
        self
    }

    /// Apply programmatic overrides with the highest precedence.
    #[must_use]
    pub fn with_config(mut self, overrides: Config) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Do not read any configuration file.
    #[must_use]
    pub fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Do not read `TABLEBOOK_*` environment variables.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Merge all enabled sources and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or the merged
    /// configuration is invalid.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        if !self.skip_files {
            if let Some(file) = ConfigLoader::load_user_config(self.data_dir.as_deref())? {
                ConfigValidator::validate(&file)?;
                config.merge(&file);
            }
        }

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }

        if let Some(ref overrides) = self.overrides {
            config.merge(overrides);
        }

        ConfigValidator::validate(&config)?;
        log::debug!("resolved configuration: {config:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::SlotStepMode;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_precedence_file_env_override() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.yaml"),
            "slot_granularity_minutes: 30\nmax_guests: 10\nslot_step: reservation_duration\n",
        )
        .unwrap();
        std::env::set_var("TABLEBOOK_MAX_GUESTS", "14");

        let config = ConfigBuilder::new()
            .with_data_dir(temp_dir.path())
            .with_config(Config {
                slot_granularity_minutes: Some(20),
                ..Config::default()
            })
            .build()
            .unwrap();
        std::env::remove_var("TABLEBOOK_MAX_GUESTS");

        assert_eq!(config.slot_granularity_minutes, Some(20));
        assert_eq!(config.max_guests, Some(14));
        assert_eq!(config.slot_step, Some(SlotStepMode::ReservationDuration));
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.yaml"),
            "slot_granularity_minutes: 0\n",
        )
        .unwrap();

        let result = ConfigBuilder::new()
            .with_data_dir(temp_dir.path())
            .skip_env()
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_only() {
        let config = ConfigBuilder::new().skip_files().skip_env().build().unwrap();
        assert_eq!(config, Config::default());
    }
}
