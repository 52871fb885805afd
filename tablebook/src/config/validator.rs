//! Configuration validation.

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// Largest accepted slot granularity, in minutes.
pub const MAX_SLOT_GRANULARITY_MINUTES: u32 = 240;

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use tablebook::config::{Config, ConfigValidator};
///
/// ConfigValidator::validate(&Config::default()).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(minutes) = config.slot_granularity_minutes {
            if minutes == 0 || minutes > MAX_SLOT_GRANULARITY_MINUTES {
                return Err(Error::Validation {
                    field: "slot_granularity_minutes".into(),
                    message: format!(
                        "Granularity must be between 1 and {MAX_SLOT_GRANULARITY_MINUTES} minutes"
                    ),
                });
            }
        }

        if config.max_guests == Some(0) {
            return Err(Error::Validation {
                field: "max_guests".into(),
                message: "Maximum party size must be greater than 0".into(),
            });
        }

        if config.maximum_lock_wait_seconds == Some(0) {
            return Err(Error::Validation {
                field: "maximum_lock_wait_seconds".into(),
                message: "Timeout must be greater than 0".into(),
            });
        }

        Ok(())
    }
}
