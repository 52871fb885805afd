//! Buffered overlap detection between a candidate window and existing
//! reservations on one table.
//!
//! A candidate `[start, end)` conflicts with a reservation `[rs, re)` when
//! `start < re + buffer` and `rs < end + buffer`: both intervals are widened
//! by the buffer before the half-open overlap test, so every reservation on
//! a table keeps at least `buffer` of free time on either side.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use crate::database::Database;
use crate::error::Result;
use crate::model::{Reservation, Restaurant, TableId, TimeWindow};

/// The canonical buffered overlap test.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use tablebook::conflict::overlaps_with_buffer;
/// use tablebook::TimeWindow;
///
/// let at = |h, m| Utc.with_ymd_and_hms(2030, 3, 4, h, m, 0).unwrap();
/// let existing = TimeWindow::new(at(18, 0), at(19, 0)).unwrap();
/// let buffer = Duration::minutes(15);
///
/// let back_to_back = TimeWindow::new(at(19, 0), at(20, 0)).unwrap();
/// let spaced = TimeWindow::new(at(19, 15), at(20, 15)).unwrap();
/// assert!(overlaps_with_buffer(&back_to_back, &existing, buffer));
/// assert!(!overlaps_with_buffer(&spaced, &existing, buffer));
/// ```
#[must_use]
pub fn overlaps_with_buffer(candidate: &TimeWindow, existing: &TimeWindow, buffer: Duration) -> bool {
    candidate.start < existing.end + buffer && existing.start < candidate.end + buffer
}

/// Confirmed reservations among `reservations` that conflict with `candidate`.
#[must_use]
pub fn find_conflicts<'r>(
    candidate: &TimeWindow,
    reservations: &'r [Reservation],
    buffer: Duration,
) -> Vec<&'r Reservation> {
    reservations
        .iter()
        .filter(|r| r.confirmed && overlaps_with_buffer(candidate, &r.window(), buffer))
        .collect()
}

/// Result of checking one table for one candidate window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    /// The checked table.
    pub table_id: TableId,
    /// Conflicting reservations, for diagnostics.
    pub conflicts: Vec<Reservation>,
}

impl ConflictReport {
    /// Whether the table is free for the candidate window.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Checks tables against the reservations stored for them.
///
/// Reservations whose buffered end is already before `now` are never
/// fetched; anything later can still collide with a future candidate.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector<'a> {
    conn: &'a Connection,
    now: DateTime<Utc>,
}

impl<'a> ConflictDetector<'a> {
    /// Create a detector reading through `conn`.
    #[must_use]
    pub const fn new(conn: &'a Connection, now: DateTime<Utc>) -> Self {
        Self { conn, now }
    }

    /// Check `table_id` for `candidate` under `buffer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the table's reservations cannot be read.
    pub fn check(
        &self,
        table_id: TableId,
        candidate: &TimeWindow,
        buffer: Duration,
    ) -> Result<ConflictReport> {
        let reservations =
            Database::active_reservations_for_table(self.conn, table_id, self.now - buffer)?;
        let conflicts = find_conflicts(candidate, &reservations, buffer)
            .into_iter()
            .cloned()
            .collect();
        Ok(ConflictReport {
            table_id,
            conflicts,
        })
    }

    /// Shorthand for `check(..)?.is_available()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the table's reservations cannot be read.
    pub fn is_available(
        &self,
        table_id: TableId,
        candidate: &TimeWindow,
        buffer: Duration,
    ) -> Result<bool> {
        Ok(self.check(table_id, candidate, buffer)?.is_available())
    }
}

/// A restaurant's active reservations fetched once and grouped per table,
/// for checking many (table, slot) pairs without further queries.
#[derive(Debug, Clone, Default)]
pub struct TableBookings {
    by_table: HashMap<TableId, Vec<Reservation>>,
}

impl TableBookings {
    /// Group already-fetched reservations by table.
    #[must_use]
    pub fn from_reservations(reservations: Vec<Reservation>) -> Self {
        let mut by_table: HashMap<TableId, Vec<Reservation>> = HashMap::new();
        for reservation in reservations {
            by_table
                .entry(reservation.table_id)
                .or_default()
                .push(reservation);
        }
        Self { by_table }
    }

    /// Fetch every reservation of `restaurant` whose buffered end is not
    /// before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reservations cannot be read.
    pub fn fetch(conn: &Connection, restaurant: &Restaurant, now: DateTime<Utc>) -> Result<Self> {
        let cutoff = now - restaurant.buffer();
        let reservations = Database::active_reservations_for_restaurant(conn, restaurant.id, cutoff)?;
        Ok(Self::from_reservations(reservations))
    }

    /// Reservations on `table_id`, ordered by start time.
    #[must_use]
    pub fn for_table(&self, table_id: TableId) -> &[Reservation] {
        self.by_table.get(&table_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `table_id` is free for `candidate` under `buffer`.
    #[must_use]
    pub fn is_free(&self, table_id: TableId, candidate: &TimeWindow, buffer: Duration) -> bool {
        find_conflicts(candidate, self.for_table(table_id), buffer).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::{
        create_test_database, new_reservation, seed_client, seed_restaurant,
    };
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 4, h, m, 0).unwrap()
    }

    fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> TimeWindow {
        TimeWindow::new(start, end).unwrap()
    }

    fn reservation(table_id: TableId, start: DateTime<Utc>, end: DateTime<Utc>) -> Reservation {
        Reservation {
            id: start.timestamp(),
            restaurant_id: 1,
            table_id,
            client_id: 1,
            start_time: start,
            end_time: end,
            guests: 2,
            confirmed: true,
            notes: None,
        }
    }

    #[test]
    fn test_buffer_is_symmetric() {
        let existing = window(at(18, 0), at(19, 0));
        let buffer = Duration::minutes(15);

        // Too close after.
        assert!(overlaps_with_buffer(&window(at(19, 10), at(20, 10)), &existing, buffer));
        // Too close before.
        assert!(overlaps_with_buffer(&window(at(16, 50), at(17, 50)), &existing, buffer));
        // Exactly one buffer away on each side.
        assert!(!overlaps_with_buffer(&window(at(19, 15), at(20, 15)), &existing, buffer));
        assert!(!overlaps_with_buffer(&window(at(16, 45), at(17, 45)), &existing, buffer));
    }

    #[test]
    fn test_zero_buffer_is_half_open() {
        let existing = window(at(18, 0), at(19, 0));
        assert!(!overlaps_with_buffer(&window(at(19, 0), at(20, 0)), &existing, Duration::zero()));
        assert!(overlaps_with_buffer(&window(at(18, 59), at(19, 59)), &existing, Duration::zero()));
    }

    #[test]
    fn test_find_conflicts_skips_unconfirmed() {
        let mut cancelled = reservation(1, at(18, 0), at(19, 0));
        cancelled.confirmed = false;
        let kept = reservation(1, at(20, 0), at(21, 0));
        let all = vec![cancelled, kept.clone()];

        let conflicts = find_conflicts(&window(at(18, 30), at(20, 30)), &all, Duration::zero());
        assert_eq!(conflicts, vec![&kept]);
    }

    #[test]
    fn test_table_bookings_group_by_table() {
        let bookings = TableBookings::from_reservations(vec![
            reservation(1, at(18, 0), at(19, 0)),
            reservation(2, at(12, 0), at(13, 0)),
        ]);
        let candidate = window(at(18, 30), at(19, 30));
        assert!(!bookings.is_free(1, &candidate, Duration::zero()));
        assert!(bookings.is_free(2, &candidate, Duration::zero()));
        assert!(bookings.is_free(3, &candidate, Duration::zero()));
        assert!(bookings.for_table(3).is_empty());
    }

    #[test]
    fn test_detector_reads_storage() {
        let mut db = create_test_database();
        let restaurant = seed_restaurant(&mut db, 60, 15, &[4], &[]);
        let table = Database::tables(db.connection(), restaurant, 1).unwrap()[0].id;
        let client = seed_client(&mut db, "+15550100");
        db.insert_reservation(&new_reservation(restaurant, table, client, at(18, 0), 60), at(9, 0))
            .unwrap();

        let detector = ConflictDetector::new(db.connection(), at(9, 0));
        let report = detector
            .check(table, &window(at(19, 0), at(20, 0)), Duration::minutes(15))
            .unwrap();
        assert!(!report.is_available());
        assert_eq!(report.conflicts.len(), 1);
        assert!(detector
            .is_available(table, &window(at(19, 15), at(20, 15)), Duration::minutes(15))
            .unwrap());
    }

    #[test]
    fn test_detector_keeps_reservations_inside_their_buffer() {
        let mut db = create_test_database();
        let restaurant = seed_restaurant(&mut db, 60, 15, &[4], &[]);
        let table = Database::tables(db.connection(), restaurant, 1).unwrap()[0].id;
        let client = seed_client(&mut db, "+15550100");
        db.insert_reservation(&new_reservation(restaurant, table, client, at(10, 0), 60), at(9, 0))
            .unwrap();
        let buffer = Duration::minutes(15);

        // Ended at 11:00 but its buffer runs to 11:15, as the trigger sees it.
        let detector = ConflictDetector::new(db.connection(), at(11, 5));
        let report = detector
            .check(table, &window(at(11, 10), at(12, 10)), buffer)
            .unwrap();
        assert_eq!(report.conflicts.len(), 1);
        assert!(detector
            .is_available(table, &window(at(11, 15), at(12, 15)), buffer)
            .unwrap());

        // Once the buffered end has passed the row is no longer fetched.
        let detector = ConflictDetector::new(db.connection(), at(11, 20));
        assert!(detector
            .is_available(table, &window(at(10, 30), at(11, 30)), buffer)
            .unwrap());
    }
}
