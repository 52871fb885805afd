//! Greedy smallest-fit table allocation and free-gap search.
//!
//! Tables seating at least the party are tried in ascending capacity order,
//! ties broken by ascending id; the first table without a buffered conflict
//! wins. When nothing is free, [`compute_free_gaps`] lists the windows on a
//! table that could still take a reservation that day.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::conflict::ConflictDetector;
use crate::database::Database;
use crate::error::Result;
use crate::model::{Reservation, Restaurant, Table, TableId, TimeWindow};
use crate::schedule::DaySchedule;

/// Result of a table allocation attempt.
///
/// # Examples
///
/// ```
/// use tablebook::allocator::AllocationResult;
///
/// let result = AllocationResult::NoAvailability { eligible_tables: 3 };
/// assert!(result.table().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationResult {
    /// The smallest free table seating the party.
    Allocated(Table),
    /// No table seating the party is free for the window.
    NoAvailability {
        /// Tables large enough for the party, regardless of time.
        eligible_tables: usize,
    },
}

impl AllocationResult {
    /// The allocated table, if any.
    #[must_use]
    pub const fn table(&self) -> Option<&Table> {
        match self {
            Self::Allocated(table) => Some(table),
            Self::NoAvailability { .. } => None,
        }
    }
}

/// Free windows on one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableGaps {
    /// The table.
    pub table: Table,
    /// Windows long enough for a reservation, by start time.
    pub gaps: Vec<TimeWindow>,
}

/// Free windows inside `intervals` that can hold a `duration` reservation
/// while keeping `buffer` from every confirmed reservation.
///
/// Within each interval the free stretches are: opening up to the first
/// reservation's start less the buffer, each reservation's buffered end up
/// to the next start less the buffer, and the last buffered end up to
/// closing. Stretches shorter than `duration` are dropped.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use tablebook::allocator::compute_free_gaps;
/// use tablebook::TimeWindow;
///
/// let at = |h, m| Utc.with_ymd_and_hms(2030, 3, 4, h, m, 0).unwrap();
/// let open = TimeWindow::new(at(18, 0), at(22, 0)).unwrap();
/// let gaps = compute_free_gaps(&[open], &[], Duration::minutes(60), Duration::minutes(15));
/// assert_eq!(gaps, vec![open]);
/// ```
#[must_use]
pub fn compute_free_gaps(
    intervals: &[TimeWindow],
    reservations: &[Reservation],
    duration: Duration,
    buffer: Duration,
) -> Vec<TimeWindow> {
    let mut booked: Vec<TimeWindow> = reservations
        .iter()
        .filter(|r| r.confirmed)
        .map(Reservation::window)
        .collect();
    booked.sort();

    let mut gaps = Vec::new();
    for interval in intervals {
        let mut cursor = interval.start;
        for reservation in &booked {
            let blocked_from = reservation.start - buffer;
            let blocked_until = reservation.end + buffer;
            if blocked_until <= interval.start || blocked_from >= interval.end {
                continue;
            }
            if blocked_from - cursor >= duration {
                gaps.push(TimeWindow {
                    start: cursor,
                    end: blocked_from,
                });
            }
            cursor = cursor.max(blocked_until);
        }
        if interval.end - cursor >= duration {
            gaps.push(TimeWindow {
                start: cursor,
                end: interval.end,
            });
        }
    }

    gaps.sort();
    gaps
}

/// Allocates tables against stored reservations.
#[derive(Debug, Clone, Copy)]
pub struct TableAllocator<'a> {
    conn: &'a Connection,
    now: DateTime<Utc>,
}

impl<'a> TableAllocator<'a> {
    /// Create an allocator reading through `conn`.
    #[must_use]
    pub const fn new(conn: &'a Connection, now: DateTime<Utc>) -> Self {
        Self { conn, now }
    }

    /// Find the smallest free table seating `guests` for `window`.
    ///
    /// # Errors
    ///
    /// Returns an error if tables or reservations cannot be read.
    pub fn allocate(
        &self,
        restaurant: &Restaurant,
        window: &TimeWindow,
        guests: u32,
    ) -> Result<AllocationResult> {
        let tables = Database::tables(self.conn, restaurant.id, guests)?;
        let detector = ConflictDetector::new(self.conn, self.now);

        for table in &tables {
            let report = detector.check(table.id, window, restaurant.buffer())?;
            if report.is_available() {
                log::debug!(
                    "restaurant {}: table {} (capacity {}) free for {window}",
                    restaurant.id,
                    table.id,
                    table.capacity
                );
                return Ok(AllocationResult::Allocated(table.clone()));
            }
            log::debug!(
                "restaurant {}: table {} has {} conflict(s) for {window}",
                restaurant.id,
                table.id,
                report.conflicts.len()
            );
        }

        Ok(AllocationResult::NoAvailability {
            eligible_tables: tables.len(),
        })
    }

    /// Free windows on one table over a resolved day.
    ///
    /// Nothing before `now` is offered: intervals are cut at `now` first, so
    /// a gap left shorter than the reservation duration is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the table's reservations cannot be read.
    pub fn free_gaps(
        &self,
        restaurant: &Restaurant,
        table_id: TableId,
        schedule: &DaySchedule,
    ) -> Result<Vec<TimeWindow>> {
        let reservations = self.reservations_on(table_id, schedule.date(), restaurant.buffer())?;
        let intervals: Vec<TimeWindow> = schedule
            .windows()
            .filter(|interval| interval.end > self.now)
            .map(|interval| TimeWindow {
                start: interval.start.max(self.now),
                end: interval.end,
            })
            .collect();
        Ok(compute_free_gaps(
            &intervals,
            &reservations,
            restaurant.duration(),
            restaurant.buffer(),
        ))
    }

    /// Free windows on every table seating `guests` over a resolved day.
    ///
    /// Tables without any gap are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if tables or reservations cannot be read.
    pub fn alternative_slots(
        &self,
        restaurant: &Restaurant,
        schedule: &DaySchedule,
        guests: u32,
    ) -> Result<Vec<TableGaps>> {
        let mut alternatives = Vec::new();
        for table in Database::tables(self.conn, restaurant.id, guests)? {
            let gaps = self.free_gaps(restaurant, table.id, schedule)?;
            if !gaps.is_empty() {
                alternatives.push(TableGaps { table, gaps });
            }
        }
        Ok(alternatives)
    }

    fn reservations_on(
        &self,
        table_id: TableId,
        date: NaiveDate,
        buffer: Duration,
    ) -> Result<Vec<Reservation>> {
        Database::reservations_for_table_on(self.conn, table_id, date, buffer)
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

    fn booked(start: DateTime<Utc>, end: DateTime<Utc>) -> Reservation {
        Reservation {
            id: 1,
            restaurant_id: 1,
            table_id: 1,
            client_id: 1,
            start_time: start,
            end_time: end,
            guests: 2,
            confirmed: true,
            notes: None,
        }
    }

    #[test]
    fn test_gaps_keep_buffer_on_both_sides() {
        let open = window(at(12, 0), at(22, 0));
        let reservations = vec![booked(at(18, 0), at(19, 0)), booked(at(14, 0), at(15, 0))];
        let gaps = compute_free_gaps(
            &[open],
            &reservations,
            Duration::minutes(60),
            Duration::minutes(15),
        );
        assert_eq!(
            gaps,
            vec![
                window(at(12, 0), at(13, 45)),
                window(at(15, 15), at(17, 45)),
                window(at(19, 15), at(22, 0)),
            ]
        );
    }

    #[test]
    fn test_short_gaps_discarded() {
        let open = window(at(18, 0), at(22, 0));
        let reservations = vec![booked(at(18, 30), at(19, 30)), booked(at(20, 15), at(21, 15))];
        let gaps = compute_free_gaps(
            &[open],
            &reservations,
            Duration::minutes(60),
            Duration::minutes(15),
        );
        assert!(gaps.is_empty());
    }

    #[test]
    fn test_gaps_per_split_shift_interval() {
        let lunch = window(at(12, 0), at(15, 0));
        let dinner = window(at(19, 0), at(23, 0));
        let reservations = vec![booked(at(13, 0), at(14, 0))];
        let gaps = compute_free_gaps(
            &[lunch, dinner],
            &reservations,
            Duration::minutes(60),
            Duration::zero(),
        );
        assert_eq!(
            gaps,
            vec![
                window(at(12, 0), at(13, 0)),
                window(at(14, 0), at(15, 0)),
                dinner,
            ]
        );
    }

    #[test]
    fn test_closed_day_has_no_gaps() {
        assert!(compute_free_gaps(&[], &[], Duration::minutes(60), Duration::zero()).is_empty());
    }

    #[test]
    fn test_allocate_smallest_fit() {
        let mut db = create_test_database();
        let restaurant_id = seed_restaurant(&mut db, 60, 15, &[6, 2, 4], &[]);
        let restaurant = Database::restaurant(db.connection(), restaurant_id)
            .unwrap()
            .unwrap();

        let allocator = TableAllocator::new(db.connection(), at(9, 0));
        let result = allocator
            .allocate(&restaurant, &window(at(18, 0), at(19, 0)), 2)
            .unwrap();
        assert_eq!(result.table().map(|t| t.capacity), Some(2));

        let result = allocator
            .allocate(&restaurant, &window(at(18, 0), at(19, 0)), 3)
            .unwrap();
        assert_eq!(result.table().map(|t| t.capacity), Some(4));
    }

    #[test]
    fn test_allocate_skips_conflicting_table() {
        let mut db = create_test_database();
        let restaurant_id = seed_restaurant(&mut db, 60, 15, &[2, 2, 6], &[]);
        let restaurant = Database::restaurant(db.connection(), restaurant_id)
            .unwrap()
            .unwrap();
        let tables = Database::tables(db.connection(), restaurant_id, 1).unwrap();
        let client = seed_client(&mut db, "+15550100");
        db.insert_reservation(
            &new_reservation(restaurant_id, tables[0].id, client, at(18, 0), 60),
            at(9, 0),
        )
        .unwrap();

        let allocator = TableAllocator::new(db.connection(), at(9, 0));
        let result = allocator
            .allocate(&restaurant, &window(at(18, 30), at(19, 30)), 2)
            .unwrap();
        assert_eq!(result, AllocationResult::Allocated(tables[1].clone()));
    }

    #[test]
    fn test_allocate_reports_no_availability() {
        let mut db = create_test_database();
        let restaurant_id = seed_restaurant(&mut db, 60, 15, &[2, 4], &[]);
        let restaurant = Database::restaurant(db.connection(), restaurant_id)
            .unwrap()
            .unwrap();
        let tables = Database::tables(db.connection(), restaurant_id, 4).unwrap();
        let client = seed_client(&mut db, "+15550100");
        db.insert_reservation(
            &new_reservation(restaurant_id, tables[0].id, client, at(18, 0), 60),
            at(9, 0),
        )
        .unwrap();

        let allocator = TableAllocator::new(db.connection(), at(9, 0));
        let result = allocator
            .allocate(&restaurant, &window(at(19, 0), at(20, 0)), 3)
            .unwrap();
        assert_eq!(result, AllocationResult::NoAvailability { eligible_tables: 1 });

        let none = allocator
            .allocate(&restaurant, &window(at(19, 0), at(20, 0)), 8)
            .unwrap();
        assert_eq!(none, AllocationResult::NoAvailability { eligible_tables: 0 });
    }

    #[test]
    fn test_alternative_slots_from_storage() {
        let mut db = create_test_database();
        let restaurant_id = seed_restaurant(&mut db, 60, 15, &[4], &[(1, "18:00", "21:00")]);
        let restaurant = Database::restaurant(db.connection(), restaurant_id)
            .unwrap()
            .unwrap();
        let table = Database::tables(db.connection(), restaurant_id, 1).unwrap()[0].clone();
        let client = seed_client(&mut db, "+15550100");
        db.insert_reservation(
            &new_reservation(restaurant_id, table.id, client, at(18, 30), 60),
            at(9, 0),
        )
        .unwrap();

        let schedule = crate::schedule::ScheduleResolver::new(db.connection())
            .resolve(restaurant_id, at(0, 0).date_naive())
            .unwrap();
        let allocator = TableAllocator::new(db.connection(), at(9, 0));
        let alternatives = allocator.alternative_slots(&restaurant, &schedule, 2).unwrap();

        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0].table, table);
        assert_eq!(alternatives[0].gaps, vec![window(at(19, 45), at(21, 0))]);
    }

    #[test]
    fn test_gaps_start_no_earlier_than_now() {
        let mut db = create_test_database();
        let restaurant_id = seed_restaurant(&mut db, 60, 15, &[4], &[(1, "12:00", "22:00")]);
        let restaurant = Database::restaurant(db.connection(), restaurant_id)
            .unwrap()
            .unwrap();
        let schedule = crate::schedule::ScheduleResolver::new(db.connection())
            .resolve(restaurant_id, at(0, 0).date_naive())
            .unwrap();

        let allocator = TableAllocator::new(db.connection(), at(20, 0));
        let alternatives = allocator.alternative_slots(&restaurant, &schedule, 2).unwrap();
        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0].gaps, vec![window(at(20, 0), at(22, 0))]);

        // Less than a reservation left before closing.
        let late = TableAllocator::new(db.connection(), at(21, 30));
        assert!(late.alternative_slots(&restaurant, &schedule, 2).unwrap().is_empty());
    }

    #[test]
    fn test_recently_finished_reservation_still_blocks_its_table() {
        let mut db = create_test_database();
        let restaurant_id = seed_restaurant(&mut db, 60, 15, &[4, 4], &[]);
        let restaurant = Database::restaurant(db.connection(), restaurant_id)
            .unwrap()
            .unwrap();
        let tables = Database::tables(db.connection(), restaurant_id, 1).unwrap();
        let client = seed_client(&mut db, "+15550100");
        db.insert_reservation(
            &new_reservation(restaurant_id, tables[0].id, client, at(8, 0), 60),
            at(7, 0),
        )
        .unwrap();

        // 09:12 is inside the first table's buffer even though its booking ended.
        let allocator = TableAllocator::new(db.connection(), at(9, 10));
        let result = allocator
            .allocate(&restaurant, &window(at(9, 12), at(10, 12)), 2)
            .unwrap();
        assert_eq!(result, AllocationResult::Allocated(tables[1].clone()));
    }
}
