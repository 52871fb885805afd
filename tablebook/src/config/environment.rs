//! Environment variable handling for configuration overrides.
//!
//! This module provides support for `TABLEBOOK_*` environment variables that
//! override configuration file values.

use crate::config::schema::{Config, SlotStepMode};
use crate::error::{Error, Result};
use std::env;
use std::str::FromStr;

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use tablebook::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid.
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Some(minutes) = Self::parse_var("TABLEBOOK_SLOT_GRANULARITY_MINUTES")? {
            config.slot_granularity_minutes = Some(minutes);
        }

        if let Ok(step) = env::var("TABLEBOOK_SLOT_STEP") {
            config.slot_step = Some(SlotStepMode::from_str(&step).map_err(|message| {
                Error::Validation {
                    field: "TABLEBOOK_SLOT_STEP".into(),
                    message,
                }
            })?);
        }

        if let Some(max) = Self::parse_var("TABLEBOOK_MAX_GUESTS")? {
            config.max_guests = Some(max);
        }

        if let Some(seconds) = Self::parse_var("TABLEBOOK_MAXIMUM_LOCK_WAIT_SECONDS")? {
            config.maximum_lock_wait_seconds = Some(seconds);
        }

        Ok(())
    }

    fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
        match env::var(name) {
            Ok(value) => value.trim().parse().map(Some).map_err(|_| Error::Validation {
                field: name.into(),
                message: "Must be a positive integer".into(),
            }),
            Err(_) => Ok(None),
        }
    }
}
