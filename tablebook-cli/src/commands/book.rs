//! Book command implementation.
//!
//! Runs one booking transaction. When no table fits, the error on stderr
//! lists the day's free windows per eligible table so the caller can pick
//! another time.

use crate::error::CliError;
use crate::utils::{
    authenticate_caller, load_configuration, open_database, print_success, GlobalOptions,
};
use chrono::{DateTime, Utc};
use clap::Args;
use tablebook::allocator::TableGaps;
use tablebook::api::{BookingBody, ClientPayload, ReservationPayload};
use tablebook::clock::{Clock, SystemClock};
use tablebook::config::BookingPolicy;
use tablebook::model::{parse_instant, ClientId};
use tablebook::operations::{AvailabilityEngine, BookingRequest, BookingTransaction};
use tablebook::{Database, Error as LibError};

/// Book a reservation.
#[derive(Args)]
pub struct BookCommand {
    /// Requested start (RFC 3339)
    #[arg(long, value_name = "DATETIME")]
    pub start: String,

    /// Party size
    #[arg(long)]
    pub guests: u32,

    /// Existing client id
    #[arg(long, value_name = "ID", conflicts_with_all = ["name", "phone", "email"])]
    pub client_id: Option<ClientId>,

    /// Client name, for a new or returning client
    #[arg(long, requires = "phone")]
    pub name: Option<String>,

    /// Client phone; an existing client with this phone is reused
    #[arg(long, requires = "name")]
    pub phone: Option<String>,

    /// Client email
    #[arg(long, requires = "name")]
    pub email: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl BookCommand {
    fn payload(self) -> ReservationPayload {
        let client = match (self.name, self.phone) {
            (Some(name), Some(phone)) => Some(ClientPayload {
                name,
                phone,
                email: self.email,
            }),
            _ => None,
        };
        ReservationPayload {
            start_time: self.start,
            guests: self.guests,
            client_id: self.client_id,
            client,
            notes: self.notes,
        }
    }

    /// Execute the book command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let mut db = open_database(global, &config)?;
        let restaurant = authenticate_caller(global, &db)?;

        let payload = self.payload();
        let echo_client = payload.client.is_some();
        let request = payload.into_request(restaurant)?;

        let policy = config.booking_policy();
        let clock = SystemClock;
        let outcome = BookingTransaction::new(&mut db, &policy, &clock).execute(&request)?;

        match outcome.into_result() {
            Ok(booking) => {
                log::info!(
                    "booked reservation {} on table {}",
                    booking.reservation.id,
                    booking.table.id
                );
                print_success(BookingBody::new(&booking, echo_client))
            }
            Err(error @ LibError::NoAvailability { .. }) => {
                let alternatives = alternatives(&db, &policy, clock.now(), &request)?;
                Err(CliError::Unavailable {
                    error,
                    alternatives,
                })
            }
            Err(error) => Err(error.into()),
        }
    }
}

/// Free windows on every table seating the party on the requested day.
fn alternatives(
    db: &Database,
    policy: &BookingPolicy,
    now: DateTime<Utc>,
    request: &BookingRequest,
) -> Result<Vec<TableGaps>, CliError> {
    let start = parse_instant("start_time", &request.start_time)?;
    let gaps = AvailabilityEngine::new(db.connection(), policy, now).alternative_slots(
        request.restaurant_id,
        start.date_naive(),
        request.guests,
    )?;
    Ok(gaps)
}
