#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # tablebook
//!
//! Table availability and allocation engine for restaurant reservations.
//!
//! Given a restaurant's tables, weekly opening hours, date exceptions and
//! existing reservations, the library answers availability queries and
//! books reservations onto the smallest free table, keeping a buffer of
//! free time around every reservation on a table. A storage-level
//! exclusion constraint is the final arbiter when concurrent bookings race.
//!
//! ## Core Types
//!
//! - [`Database`]: the process-scoped SQLite storage handle
//! - [`TimeWindow`]: half-open reservation windows
//! - [`operations::BookingTransaction`] and [`operations::AvailabilityEngine`]:
//!   the request-level entry points
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use tablebook::conflict::overlaps_with_buffer;
//! use tablebook::TimeWindow;
//!
//! let at = |h| Utc.with_ymd_and_hms(2030, 3, 4, h, 0, 0).unwrap();
//! let dinner = TimeWindow::new(at(18), at(19)).unwrap();
//! let next = TimeWindow::starting_at(at(19), Duration::hours(1));
//!
//! // Back to back is too close with a 15 minute buffer.
//! assert!(overlaps_with_buffer(&next, &dinner, Duration::minutes(15)));
//! ```

pub mod allocator;
pub mod api;
pub mod clients;
pub mod clock;
pub mod config;
pub mod conflict;
pub mod database;
pub mod error;
pub mod identity;
pub mod logging;
pub mod model;
pub mod operations;
pub mod schedule;
pub mod slots;

#[cfg(test)]
mod conflict_proptests;
#[cfg(test)]
mod slots_proptests;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use database::{Database, DatabaseConfig};
pub use error::{Error, ErrorKind, Result};
pub use logging::{init_logger, resolve_log_level, LogLevel, Logger};
pub use model::TimeWindow;
