//! List command implementation.
//!
//! Prints the caller's confirmed reservations ordered by start time.

use crate::error::CliError;
use crate::utils::{
    authenticate_caller, load_configuration, open_database, print_success, GlobalOptions,
};
use clap::Args;
use tablebook::api::ReservationBody;
use tablebook::database::ReservationFilter;
use tablebook::model::{parse_date, TableId};
use tablebook::Database;

/// List confirmed reservations.
#[derive(Args)]
pub struct ListCommand {
    /// Only reservations starting on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Only reservations on this table
    #[arg(long, value_name = "ID")]
    pub table: Option<TableId>,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;
        let restaurant = authenticate_caller(global, &db)?;

        let filter = ReservationFilter {
            from_date: self
                .date
                .as_deref()
                .map(|date| parse_date("date", date))
                .transpose()?,
            table_id: self.table,
        };
        let reservations = Database::list_reservations(db.connection(), restaurant, &filter)?;

        let bodies: Vec<ReservationBody> =
            reservations.iter().map(ReservationBody::from).collect();
        print_success(bodies)
    }
}
