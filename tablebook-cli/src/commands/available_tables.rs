//! Available-tables command implementation.
//!
//! Lists the tables seating the party that are free for the whole
//! reservation window starting at the given slot, smallest first.

use crate::error::CliError;
use crate::utils::{
    authenticate_caller, load_configuration, open_database, print_success, GlobalOptions,
};
use clap::Args;
use tablebook::api::{AvailableTablesQuery, TableSummary};
use tablebook::clock::{Clock, SystemClock};
use tablebook::operations::AvailabilityEngine;

/// List free tables for a slot.
#[derive(Args)]
pub struct AvailableTablesCommand {
    /// Date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,

    /// Start time (HH:MM, UTC)
    #[arg(long)]
    pub time: String,

    /// Party size
    #[arg(long)]
    pub guests: u32,
}

impl AvailableTablesCommand {
    /// Execute the available-tables command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;
        let restaurant = authenticate_caller(global, &db)?;

        let query = AvailableTablesQuery {
            date: self.date,
            time: self.time,
            guests: self.guests,
        };
        let (date, time) = query.slot()?;
        let policy = config.booking_policy();
        let tables = AvailabilityEngine::new(db.connection(), &policy, SystemClock.now())
            .available_tables(restaurant, date, time, query.guests)?;

        let summaries: Vec<TableSummary> = tables.iter().map(TableSummary::from).collect();
        print_success(summaries)
    }
}
