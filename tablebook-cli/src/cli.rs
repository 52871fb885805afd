//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands. Each request-handling
//! subcommand mirrors one API endpoint.

use crate::commands::{
    AvailabilityCommand, AvailableTablesCommand, BookCommand, CompletionsCommand, GapsCommand,
    ImportCommand, InitCommand, ListCommand, SlotCommand,
};
use crate::utils::GlobalOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Check restaurant table availability and book reservations.
#[derive(Parser)]
#[command(name = "tablebook")]
#[command(
    version,
    about = "Check restaurant table availability and book reservations",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "TABLEBOOK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds)
    #[arg(long, value_name = "SECONDS", global = true, env = "TABLEBOOK_BUSY_TIMEOUT")]
    pub busy_timeout: Option<u32>,

    /// API key of the restaurant the request acts for
    #[arg(
        long,
        value_name = "KEY",
        global = true,
        env = "TABLEBOOK_API_KEY",
        hide_env_values = true
    )]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Options shared by every command.
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            verbose: self.verbose,
            quiet: self.quiet,
            data_dir: self.data_dir.clone(),
            busy_timeout: self.busy_timeout,
            api_key: self.api_key.clone(),
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize the data directory and database
    Init(InitCommand),

    /// Import restaurants, tables and schedules from a catalog file
    Import(ImportCommand),

    /// List the day's bookable slots for a party size
    Availability(AvailabilityCommand),

    /// Check a single slot for a party size
    Slot(SlotCommand),

    /// List the tables free for a slot
    AvailableTables(AvailableTablesCommand),

    /// Book a reservation on the smallest free table
    Book(BookCommand),

    /// Show the free windows of one table on a date
    Gaps(GapsCommand),

    /// List confirmed reservations
    List(ListCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}

impl Command {
    /// Run the selected command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), crate::error::CliError> {
        match self {
            Command::Init(cmd) => cmd.execute(global),
            Command::Import(cmd) => cmd.execute(global),
            Command::Availability(cmd) => cmd.execute(global),
            Command::Slot(cmd) => cmd.execute(global),
            Command::AvailableTables(cmd) => cmd.execute(global),
            Command::Book(cmd) => cmd.execute(global),
            Command::Gaps(cmd) => cmd.execute(global),
            Command::List(cmd) => cmd.execute(global),
            Command::Completions(cmd) => cmd.execute(global),
        }
    }
}
