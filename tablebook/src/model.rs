//! Domain types for restaurants, tables, schedules, clients and reservations.
//!
//! Restaurants, tables and schedules are reference data owned by an external
//! configuration collaborator; the engine only reads them. Reservations are
//! created exclusively by the booking transaction.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a restaurant.
pub type RestaurantId = i64;
/// Identifier of a physical table.
pub type TableId = i64;
/// Identifier of a seating zone.
pub type ZoneId = i64;
/// Identifier of a client record.
pub type ClientId = i64;
/// Identifier of a reservation.
pub type ReservationId = i64;

/// A restaurant and its booking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Restaurant identifier.
    pub id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Length of every reservation, in minutes.
    pub reservation_duration: u32,
    /// Minimum gap kept around each reservation on the same table, in minutes.
    pub buffer_time: u32,
}

impl Restaurant {
    /// Length of every reservation.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.reservation_duration))
    }

    /// Buffer enforced on both sides of a reservation.
    #[must_use]
    pub fn buffer(&self) -> Duration {
        Duration::minutes(i64::from(self.buffer_time))
    }

    /// The window of a reservation starting at `start`.
    #[must_use]
    pub fn window_starting_at(&self, start: DateTime<Utc>) -> TimeWindow {
        TimeWindow::starting_at(start, self.duration())
    }
}

/// A physical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table identifier.
    pub id: TableId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Number of seats (at least 1).
    pub capacity: u32,
    /// Optional seating zone.
    pub zone_id: Option<ZoneId>,
}

/// One open interval of the weekly schedule.
///
/// Several entries on the same weekday describe split shifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyScheduleEntry {
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Day of week, 0 = Sunday through 6 = Saturday.
    pub day_of_week: u8,
    /// Opening time of day.
    pub opening_time: NaiveTime,
    /// Closing time of day.
    pub closing_time: NaiveTime,
}

/// A date-specific override of the weekly schedule.
///
/// When any exception row exists for a date, the weekly entries are ignored
/// for that date. A row without times marks the date closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleException {
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Date the override applies to.
    pub date: NaiveDate,
    /// Overriding opening time, if open.
    pub opening_time: Option<NaiveTime>,
    /// Overriding closing time, if open.
    pub closing_time: Option<NaiveTime>,
    /// Free-form reason ("Christmas", "private event").
    pub description: Option<String>,
}

/// A client record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client identifier.
    pub id: ClientId,
    /// Full name.
    pub name: String,
    /// Normalized phone number (unique).
    pub phone: String,
    /// Optional e-mail address (unique when present).
    pub email: Option<String>,
}

/// Raw client data supplied with a booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    /// Full name.
    pub name: String,
    /// Phone number, possibly with spaces, dashes or parentheses.
    pub phone: String,
    /// Optional e-mail address.
    #[serde(default)]
    pub email: Option<String>,
}

/// A persisted reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation identifier.
    pub id: ReservationId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Assigned table.
    pub table_id: TableId,
    /// Booking client.
    pub client_id: ClientId,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant, always `start_time + reservation_duration`.
    pub end_time: DateTime<Utc>,
    /// Party size.
    pub guests: u32,
    /// Whether the reservation counts for conflict purposes.
    pub confirmed: bool,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Reservation {
    /// The unbuffered window occupied by this reservation.
    #[must_use]
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// A reservation about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Assigned table.
    pub table_id: TableId,
    /// Booking client.
    pub client_id: ClientId,
    /// Occupied window.
    pub window: TimeWindow,
    /// Party size.
    pub guests: u32,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// A half-open interval `[start, end)` of UTC instants.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use tablebook::TimeWindow;
///
/// let start = Utc.with_ymd_and_hms(2030, 6, 1, 18, 0, 0).unwrap();
/// let window = TimeWindow::starting_at(start, Duration::minutes(90));
/// assert_eq!(window.duration(), Duration::minutes(90));
/// assert!(window.contains(start));
/// assert!(!window.contains(window.end));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, rejecting empty or inverted ranges.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(Error::Validation {
                field: "end_time".into(),
                message: format!("window end {end} must be after start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    /// The window of length `duration` beginning at `start`.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    /// Length of the window.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `instant` lies inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Standard half-open overlap test.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format("%Y-%m-%dT%H:%MZ"),
            self.end.format("%Y-%m-%dT%H:%MZ")
        )
    }
}

/// Day-of-week index used by the weekly schedule: 0 = Sunday.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use tablebook::model::day_of_week;
///
/// let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
/// assert_eq!(day_of_week(christmas), 3); // Wednesday
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// The UTC instant of `time` on `date`.
#[must_use]
pub fn instant_on(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

/// Parses a time of day in `HH:MM` or `HH:MM:SS` form.
///
/// # Errors
///
/// Returns a validation error naming `field` if the value is malformed.
///
/// # Examples
///
/// ```
/// use tablebook::model::parse_time_of_day;
///
/// assert!(parse_time_of_day("time", "18:30").is_ok());
/// assert!(parse_time_of_day("time", "18:30:00").is_ok());
/// assert!(parse_time_of_day("time", "6pm").is_err());
/// ```
pub fn parse_time_of_day(field: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| Error::Validation {
            field: field.into(),
            message: "time must be in HH:MM format".into(),
        })
}

/// Parses a calendar date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns a validation error naming `field` if the value is malformed.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| Error::Validation {
        field: field.into(),
        message: "date must be in YYYY-MM-DD format".into(),
    })
}

/// Parses an RFC 3339 instant, normalizing it to UTC.
///
/// # Errors
///
/// Returns a validation error naming `field` if the value is malformed.
pub fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::Validation {
            field: field.into(),
            message: "Invalid date format".into(),
        })
}
