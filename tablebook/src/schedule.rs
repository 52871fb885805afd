//! Effective opening hours for a restaurant on a date.
//!
//! A date's hours come from its schedule exceptions when any exist (closed
//! when none of them carry times), otherwise from every weekly row for the
//! weekday. Several intervals on one day are split shifts and are kept
//! separate: a reservation must fit inside a single interval.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::database::Database;
use crate::error::Result;
use crate::model::{day_of_week, instant_on, RestaurantId, ScheduleException, TimeWindow, WeeklyScheduleEntry};

/// One open interval as times of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct OpenInterval {
    /// Opening time.
    pub opening: NaiveTime,
    /// Closing time, after `opening`.
    pub closing: NaiveTime,
}

/// How a reservation window relates to a day's opening hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFit {
    /// The window lies inside one open interval.
    Fits,
    /// The window ends after the closing of the last interval that opened
    /// at or before its start.
    AfterClosing {
        /// Closing instant of that interval.
        closing: DateTime<Utc>,
    },
    /// The start precedes the first opening, or the day is closed.
    OutsideOpeningHours,
}

/// The resolved opening hours of one date, ordered by opening time.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use tablebook::model::WeeklyScheduleEntry;
/// use tablebook::schedule::DaySchedule;
///
/// let monday = NaiveDate::from_ymd_opt(2030, 3, 4).unwrap();
/// let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
/// let rows = vec![
///     WeeklyScheduleEntry { restaurant_id: 1, day_of_week: 1, opening_time: hm(19, 0), closing_time: hm(23, 0) },
///     WeeklyScheduleEntry { restaurant_id: 1, day_of_week: 1, opening_time: hm(12, 0), closing_time: hm(15, 0) },
/// ];
/// let schedule = DaySchedule::from_rows(monday, &rows, &[]);
/// assert_eq!(schedule.intervals().len(), 2);
/// assert_eq!(schedule.envelope(), Some((hm(12, 0), hm(23, 0))));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    date: NaiveDate,
    intervals: Vec<OpenInterval>,
}

impl DaySchedule {
    /// Resolve a date's hours from its weekly rows and exception rows.
    #[must_use]
    pub fn from_rows(
        date: NaiveDate,
        weekly: &[WeeklyScheduleEntry],
        exceptions: &[ScheduleException],
    ) -> Self {
        let mut intervals: Vec<OpenInterval> = if exceptions.is_empty() {
            weekly
                .iter()
                .map(|entry| OpenInterval {
                    opening: entry.opening_time,
                    closing: entry.closing_time,
                })
                .collect()
        } else {
            exceptions
                .iter()
                .filter_map(|exception| match (exception.opening_time, exception.closing_time) {
                    (Some(opening), Some(closing)) => Some(OpenInterval { opening, closing }),
                    _ => None,
                })
                .collect()
        };
        intervals.retain(|interval| interval.closing > interval.opening);
        intervals.sort();
        Self { date, intervals }
    }

    /// A day with no open interval.
    #[must_use]
    pub const fn closed(date: NaiveDate) -> Self {
        Self {
            date,
            intervals: Vec::new(),
        }
    }

    /// The resolved date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Open intervals, ordered by opening time.
    #[must_use]
    pub fn intervals(&self) -> &[OpenInterval] {
        &self.intervals
    }

    /// Whether the restaurant is closed all day.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Earliest opening and latest closing across all intervals.
    ///
    /// Collapses split-shift gaps: only use it for coarse bounding, never to
    /// decide whether an instant is open.
    #[must_use]
    pub fn envelope(&self) -> Option<(NaiveTime, NaiveTime)> {
        let opening = self.intervals.iter().map(|i| i.opening).min()?;
        let closing = self.intervals.iter().map(|i| i.closing).max()?;
        Some((opening, closing))
    }

    /// The open intervals as UTC instants on this date.
    pub fn windows(&self) -> impl Iterator<Item = TimeWindow> + '_ {
        self.intervals.iter().map(|interval| TimeWindow {
            start: instant_on(self.date, interval.opening),
            end: instant_on(self.date, interval.closing),
        })
    }

    /// The open interval containing `instant`, if any.
    #[must_use]
    pub fn interval_containing(&self, instant: DateTime<Utc>) -> Option<TimeWindow> {
        self.windows().find(|window| window.contains(instant))
    }

    /// Test a reservation window against the individual intervals.
    ///
    /// A start in a split-shift gap or after the last closing is measured
    /// against the interval that closed before it.
    #[must_use]
    pub fn check_window(&self, window: &TimeWindow) -> WindowFit {
        match self.windows().filter(|open| open.start <= window.start).last() {
            None => WindowFit::OutsideOpeningHours,
            Some(open) if window.end > open.end => WindowFit::AfterClosing { closing: open.end },
            Some(_) => WindowFit::Fits,
        }
    }

    /// Whether a reservation window lies inside one open interval.
    #[must_use]
    pub fn fits(&self, window: &TimeWindow) -> bool {
        self.check_window(window) == WindowFit::Fits
    }
}

/// Reads schedule rows from storage and resolves them per date.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleResolver<'a> {
    conn: &'a Connection,
}

impl<'a> ScheduleResolver<'a> {
    /// Create a resolver reading through `conn`.
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Resolve the effective opening hours of `restaurant_id` on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule rows cannot be read.
    pub fn resolve(&self, restaurant_id: RestaurantId, date: NaiveDate) -> Result<DaySchedule> {
        let exceptions = Database::schedule_exceptions(self.conn, restaurant_id, date)?;
        let weekly = if exceptions.is_empty() {
            Database::weekly_schedule(self.conn, restaurant_id, day_of_week(date))?
        } else {
            log::debug!(
                "restaurant {restaurant_id}: {} exception row(s) override {date}",
                exceptions.len()
            );
            Vec::new()
        };
        Ok(DaySchedule::from_rows(date, &weekly, &exceptions))
    }
}
