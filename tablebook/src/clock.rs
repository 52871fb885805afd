//! Source of the current instant.
//!
//! Booking and availability decisions depend on "now" (future-only bookings,
//! ignoring reservations that already ended). The trait lets tests pin the
//! clock while production code reads the system time.

use chrono::{DateTime, Utc};

/// Trait for reading the current instant.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tablebook::clock::{Clock, FixedClock};
///
/// let at = Utc.with_ymd_and_hms(2030, 5, 1, 12, 0, 0).unwrap();
/// let clock = FixedClock::new(at);
/// assert_eq!(clock.now(), at);
/// ```
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock that always reports `at`.
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
