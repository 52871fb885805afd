//! Library exports for tablebook-cli.
//!
//! The binary and the integration tests share the CLI definition through
//! this crate.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
