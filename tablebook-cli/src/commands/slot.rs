//! Slot command implementation.

use crate::error::CliError;
use crate::utils::{
    authenticate_caller, load_configuration, open_database, print_success, GlobalOptions,
};
use clap::Args;
use tablebook::api::AvailableTablesQuery;
use tablebook::clock::{Clock, SystemClock};
use tablebook::operations::AvailabilityEngine;

/// Check one slot for a party size.
#[derive(Args)]
pub struct SlotCommand {
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

impl SlotCommand {
    /// Execute the slot command.
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
        let slot = AvailabilityEngine::new(db.connection(), &policy, SystemClock.now())
            .slot(restaurant, date, time, query.guests)?;

        print_success(slot)
    }
}
