//! Gaps command implementation.

use crate::error::CliError;
use crate::utils::{
    authenticate_caller, load_configuration, open_database, print_success, GlobalOptions,
};
use clap::Args;
use tablebook::clock::{Clock, SystemClock};
use tablebook::model::{parse_date, TableId};
use tablebook::operations::AvailabilityEngine;

/// Show the free windows of one table.
#[derive(Args)]
pub struct GapsCommand {
    /// Table id
    #[arg(long, value_name = "ID")]
    pub table: TableId,

    /// Date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,
}

impl GapsCommand {
    /// Execute the gaps command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;
        let restaurant = authenticate_caller(global, &db)?;

        let date = parse_date("date", &self.date)?;
        let policy = config.booking_policy();
        let gaps = AvailabilityEngine::new(db.connection(), &policy, SystemClock.now())
            .free_gaps(restaurant, self.table, date)?;

        print_success(gaps)
    }
}
