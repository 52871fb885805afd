//! The reservation booking transaction.
//!
//! A booking validates the request, checks the window against the day's
//! opening hours, resolves the client, picks the smallest free table and
//! inserts the reservation. The allocation step is only a pre-check: the
//! storage exclusion constraint decides, and losing to a concurrent insert
//! is reported as [`BookingOutcome::TableNoLongerAvailable`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::allocator::{AllocationResult, TableAllocator};
use crate::clients::{validate_client, ClientDirectory};
use crate::clock::Clock;
use crate::config::BookingPolicy;
use crate::database::Database;
use crate::error::{Error, ErrorKind, Result};
use crate::model::{
    parse_instant, Client, ClientId, NewClient, NewReservation, Reservation, RestaurantId, Table,
    TableId,
};
use crate::schedule::{ScheduleResolver, WindowFit};

/// Who the reservation is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRef {
    /// A client that must already exist.
    Existing(ClientId),
    /// Raw client data, matched by phone or created.
    Details(NewClient),
}

/// A booking request as received from a caller.
///
/// # Examples
///
/// ```
/// use tablebook::operations::{BookingRequest, ClientRef};
///
/// let request = BookingRequest::new(1, "2030-03-04T19:00:00Z", 2, ClientRef::Existing(7))
///     .with_notes(Some("window seat".to_string()));
/// assert_eq!(request.guests, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// Restaurant resolved from the caller's credential.
    pub restaurant_id: RestaurantId,
    /// Requested start as an RFC 3339 instant.
    pub start_time: String,
    /// Party size.
    pub guests: u32,
    /// The client the reservation is for.
    pub client: ClientRef,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl BookingRequest {
    /// Creates a request without notes.
    #[must_use]
    pub fn new(
        restaurant_id: RestaurantId,
        start_time: impl Into<String>,
        guests: u32,
        client: ClientRef,
    ) -> Self {
        Self {
            restaurant_id,
            start_time: start_time.into(),
            guests,
            client,
            notes: None,
        }
    }

    /// Sets the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }
}

/// A successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    /// The stored reservation.
    pub reservation: Reservation,
    /// The allocated table.
    pub table: Table,
    /// The client the reservation belongs to.
    pub client: Client,
}

/// Every way a well-formed booking attempt can end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    /// The reservation was stored.
    Booked(Booking),
    /// The request was rejected before touching storage.
    ValidationFailed(Vec<String>),
    /// The window ends after the interval it starts in (or follows) closes.
    AfterClosing {
        /// Requested end.
        end: DateTime<Utc>,
        /// Closing instant of that interval.
        closing: DateTime<Utc>,
    },
    /// The restaurant is closed at the requested start.
    OutsideOpeningHours {
        /// Requested start.
        start: DateTime<Utc>,
    },
    /// No table seating the party is free; pick another time.
    NoAvailability {
        /// Tables large enough for the party, regardless of time.
        eligible_tables: usize,
    },
    /// A table was free at allocation time but lost to a concurrent booking.
    TableNoLongerAvailable {
        /// The lost table.
        table_id: TableId,
    },
}

impl BookingOutcome {
    /// Whether the reservation was stored.
    #[must_use]
    pub const fn is_booked(&self) -> bool {
        matches!(self, Self::Booked(_))
    }

    /// Converts every non-booked outcome into the matching [`Error`].
    ///
    /// # Errors
    ///
    /// Returns the error equivalent of any outcome other than
    /// [`BookingOutcome::Booked`].
    pub fn into_result(self) -> Result<Booking> {
        match self {
            Self::Booked(booking) => Ok(booking),
            Self::ValidationFailed(reasons) => Err(Error::InvalidRequest { reasons }),
            Self::AfterClosing { end, closing } => Err(Error::AfterClosing { end, closing }),
            Self::OutsideOpeningHours { start } => Err(Error::OutsideOpeningHours { start }),
            Self::NoAvailability { eligible_tables: 0 } => Err(Error::NoAvailability {
                reason: "No suitable table available".into(),
            }),
            Self::NoAvailability { .. } => Err(Error::NoAvailability {
                reason: "No availability for requested time".into(),
            }),
            Self::TableNoLongerAvailable { table_id } => {
                Err(Error::TableNoLongerAvailable { table_id })
            }
        }
    }
}

/// The reason a party size is refused, if it is.
pub(super) fn guest_count_problem(guests: u32, max_guests: u32) -> Option<String> {
    if guests < 1 {
        Some("Guest count must be at least 1".to_string())
    } else if guests > max_guests {
        Some(format!("Guest count cannot exceed {max_guests}"))
    } else {
        None
    }
}

/// Runs booking requests against one storage handle.
///
/// # Examples
///
/// ```no_run
/// use tablebook::clock::SystemClock;
/// use tablebook::config::BookingPolicy;
/// use tablebook::operations::{BookingRequest, BookingTransaction, ClientRef};
/// use tablebook::{Database, DatabaseConfig};
///
/// let mut db = Database::open(DatabaseConfig::new("/tmp/tablebook.db")).unwrap();
/// let policy = BookingPolicy::default();
/// let mut booking = BookingTransaction::new(&mut db, &policy, &SystemClock);
///
/// let request = BookingRequest::new(1, "2030-03-04T19:00:00Z", 2, ClientRef::Existing(1));
/// let outcome = booking.execute(&request).unwrap();
/// println!("booked: {}", outcome.is_booked());
/// ```
#[derive(Debug)]
pub struct BookingTransaction<'a, C: Clock> {
    db: &'a mut Database,
    policy: &'a BookingPolicy,
    clock: &'a C,
}

impl<'a, C: Clock> BookingTransaction<'a, C> {
    /// Creates a booking transaction.
    pub fn new(db: &'a mut Database, policy: &'a BookingPolicy, clock: &'a C) -> Self {
        Self { db, policy, clock }
    }

    /// Books a table for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown restaurant or client id,
    /// [`Error::DuplicateClient`] when new client data collides with another
    /// client's e-mail, or a storage error. Business-rule rejections are
    /// returned as [`BookingOutcome`] variants instead.
    pub fn execute(&mut self, request: &BookingRequest) -> Result<BookingOutcome> {
        let outcome = self.run(request);
        if let Err(ref e) = outcome {
            if e.kind() == ErrorKind::Internal {
                log::error!(
                    "booking for restaurant {} at {} failed: {e}",
                    request.restaurant_id,
                    request.start_time
                );
            }
        }
        outcome
    }

    fn run(&mut self, request: &BookingRequest) -> Result<BookingOutcome> {
        let now = self.clock.now();

        let start = match self.validate(request, now) {
            Ok(start) => start,
            Err(reasons) => {
                log::info!(
                    "restaurant {}: booking rejected: {}",
                    request.restaurant_id,
                    reasons.join(", ")
                );
                return Ok(BookingOutcome::ValidationFailed(reasons));
            }
        };

        let restaurant = Database::restaurant(self.db.connection(), request.restaurant_id)?
            .ok_or_else(|| Error::not_found(format!("restaurant {}", request.restaurant_id)))?;
        let window = restaurant.window_starting_at(start);

        let schedule =
            ScheduleResolver::new(self.db.connection()).resolve(restaurant.id, start.date_naive())?;
        match schedule.check_window(&window) {
            WindowFit::Fits => {}
            WindowFit::AfterClosing { closing } => {
                log::info!(
                    "restaurant {}: {window} runs past closing at {closing}",
                    restaurant.id
                );
                return Ok(BookingOutcome::AfterClosing {
                    end: window.end,
                    closing,
                });
            }
            WindowFit::OutsideOpeningHours => {
                log::info!("restaurant {}: closed at {start}", restaurant.id);
                return Ok(BookingOutcome::OutsideOpeningHours { start });
            }
        }

        let client = {
            let mut directory = ClientDirectory::new(self.db);
            match &request.client {
                ClientRef::Existing(id) => directory.get(*id)?,
                ClientRef::Details(details) => directory.find_or_create(details, now)?,
            }
        };

        let allocation = TableAllocator::new(self.db.connection(), now).allocate(
            &restaurant,
            &window,
            request.guests,
        )?;
        let table = match allocation {
            AllocationResult::Allocated(table) => table,
            AllocationResult::NoAvailability { eligible_tables } => {
                log::info!(
                    "restaurant {}: no table for {} guest(s) at {window} ({eligible_tables} eligible)",
                    restaurant.id,
                    request.guests
                );
                return Ok(BookingOutcome::NoAvailability { eligible_tables });
            }
        };

        let new = NewReservation {
            restaurant_id: restaurant.id,
            table_id: table.id,
            client_id: client.id,
            window,
            guests: request.guests,
            notes: request
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|notes| !notes.is_empty())
                .map(str::to_string),
        };

        match self.db.insert_reservation(&new, now) {
            Ok(reservation) => {
                log::info!(
                    "restaurant {}: reservation {} on table {} for {window}",
                    restaurant.id,
                    reservation.id,
                    table.id
                );
                Ok(BookingOutcome::Booked(Booking {
                    reservation,
                    table,
                    client,
                }))
            }
            Err(Error::TableNoLongerAvailable { table_id }) => {
                Ok(BookingOutcome::TableNoLongerAvailable { table_id })
            }
            Err(e) => Err(e),
        }
    }

    /// The parsed start, or every input problem found.
    fn validate(
        &self,
        request: &BookingRequest,
        now: DateTime<Utc>,
    ) -> std::result::Result<DateTime<Utc>, Vec<String>> {
        let mut reasons = Vec::new();

        reasons.extend(guest_count_problem(request.guests, self.policy.max_guests));

        let start = match parse_instant("start_time", &request.start_time) {
            Ok(start) if start <= now => {
                reasons.push("Reservation date must be in the future".to_string());
                None
            }
            Ok(start) => Some(start),
            Err(_) => {
                reasons.push("Invalid date format".to_string());
                None
            }
        };

        if let ClientRef::Details(details) = &request.client {
            if let Err(Error::InvalidRequest { reasons: found }) = validate_client(details) {
                reasons.extend(found);
            }
        }

        match start {
            Some(start) if reasons.is_empty() => Ok(start),
            _ => Err(reasons),
        }
    }
}
