//! Request-level operations built on the core components.
//!
//! Each operation borrows the process-scoped storage handle for the duration
//! of one request and holds no state between requests:
//!
//! - [`BookingTransaction`] validates, allocates and inserts a reservation.
//! - [`AvailabilityEngine`] answers read-only availability queries.
//! - [`init_database`] prepares a data directory.
//!
//! # Examples
//!
//! ```no_run
//! use tablebook::clock::SystemClock;
//! use tablebook::config::ConfigBuilder;
//! use tablebook::operations::{BookingRequest, BookingTransaction, ClientRef};
//! use tablebook::model::NewClient;
//! use tablebook::{Database, DatabaseConfig};
//!
//! let mut db = Database::open(DatabaseConfig::new("/tmp/tablebook.db")).unwrap();
//! let policy = ConfigBuilder::new().build().unwrap().booking_policy();
//!
//! let client = ClientRef::Details(NewClient {
//!     name: "Ada Lovelace".into(),
//!     phone: "+44 20 7946 0000".into(),
//!     email: None,
//! });
//! let request = BookingRequest::new(1, "2030-03-04T19:00:00Z", 2, client);
//! let booking = BookingTransaction::new(&mut db, &policy, &SystemClock)
//!     .execute(&request)
//!     .unwrap()
//!     .into_result()
//!     .unwrap();
//! println!("table {}", booking.table.id);
//! ```

pub mod availability;
pub mod book;
pub mod init;

pub use availability::{AvailabilityEngine, AvailabilityReport, SlotAvailability};
pub use book::{Booking, BookingOutcome, BookingRequest, BookingTransaction, ClientRef};
pub use init::{init_database, InitOptions, InitResult};
