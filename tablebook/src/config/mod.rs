//! Configuration system for tablebook.
//!
//! This module provides layered configuration with support for:
//! - A YAML configuration file (`config.yaml` in the data directory)
//! - Environment variable overrides (`TABLEBOOK_*`)
//! - Programmatic configuration via builder pattern
//! - Validation
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`TABLEBOOK_*`)
//! 3. `{data_dir}/config.yaml`
//! 4. Built-in defaults
//!
//! # Examples
//!
//! ```no_run
//! use tablebook::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new().build().unwrap();
//! let policy = config.booking_policy();
//! println!("slots every {} minutes", policy.slot_granularity.num_minutes());
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod schema;
pub mod validator;

pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use schema::{BookingPolicy, Config, SlotStepMode};
pub use validator::ConfigValidator;
