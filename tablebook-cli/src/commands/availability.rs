//! Availability command implementation.
//!
//! Lists the day's future slots that have at least one free table for the
//! party, with the best per-slot table count.

use crate::error::CliError;
use crate::utils::{
    authenticate_caller, load_configuration, open_database, print_success, GlobalOptions,
};
use clap::Args;
use tablebook::api::AvailabilityQuery;
use tablebook::clock::{Clock, SystemClock};
use tablebook::operations::AvailabilityEngine;

/// List bookable slots for a day.
#[derive(Args)]
pub struct AvailabilityCommand {
    /// Any instant on the day to inspect (RFC 3339)
    #[arg(long, value_name = "DATETIME")]
    pub datetime: String,

    /// Party size
    #[arg(long)]
    pub guests: u32,
}

impl AvailabilityCommand {
    /// Execute the availability command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;
        let restaurant = authenticate_caller(global, &db)?;

        let query = AvailabilityQuery {
            datetime: self.datetime,
            guests: self.guests,
        };
        let policy = config.booking_policy();
        let report = AvailabilityEngine::new(db.connection(), &policy, SystemClock.now())
            .check(restaurant, query.instant()?, query.guests)?;

        print_success(report)
    }
}
