//! Availability queries: free slots for a day, free tables for one slot and
//! alternative windows when nothing is free.
//!
//! Reservations are fetched once per query and grouped per table, so a day
//! of slots costs a single reservation read regardless of slot count.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::allocator::{TableAllocator, TableGaps};
use crate::config::BookingPolicy;
use crate::conflict::{ConflictDetector, TableBookings};
use crate::database::Database;
use crate::error::{Error, Result};
use crate::model::{instant_on, Restaurant, RestaurantId, Table, TableId, TimeWindow};
use crate::schedule::{DaySchedule, ScheduleResolver};
use crate::slots::SlotSequence;

use super::book::guest_count_problem;

/// Availability of a whole day for one party size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    /// Future slot starts with at least one free table.
    pub available_slots: Vec<DateTime<Utc>>,
    /// Largest number of free tables in any single slot.
    pub tables_available: usize,
    /// Tables seating the party, regardless of time.
    pub total_tables: usize,
}

/// Availability of one slot for one party size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    /// Whether any table is free.
    pub available: bool,
    /// Free tables seating the party.
    pub tables_available: usize,
    /// Tables seating the party, regardless of time.
    pub total_tables: usize,
}

/// Read-only availability queries for one storage handle.
///
/// # Examples
///
/// ```no_run
/// use chrono::{TimeZone, Utc};
/// use tablebook::config::BookingPolicy;
/// use tablebook::operations::AvailabilityEngine;
/// use tablebook::{Database, DatabaseConfig};
///
/// let db = Database::open(DatabaseConfig::new("/tmp/tablebook.db")).unwrap();
/// let policy = BookingPolicy::default();
/// let engine = AvailabilityEngine::new(db.connection(), &policy, Utc::now());
///
/// let evening = Utc.with_ymd_and_hms(2030, 3, 4, 19, 0, 0).unwrap();
/// let report = engine.check(1, evening, 4).unwrap();
/// println!("{} of {} tables free", report.tables_available, report.total_tables);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityEngine<'a> {
    conn: &'a Connection,
    policy: &'a BookingPolicy,
    now: DateTime<Utc>,
}

impl<'a> AvailabilityEngine<'a> {
    /// Creates an engine reading through `conn` as of `now`.
    #[must_use]
    pub const fn new(conn: &'a Connection, policy: &'a BookingPolicy, now: DateTime<Utc>) -> Self {
        Self { conn, policy, now }
    }

    /// Slot availability over the whole day containing `datetime`.
    ///
    /// A slot counts only if it starts after `now` and its reservation
    /// window fits inside one open interval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for an out-of-range party size,
    /// [`Error::NotFound`] for an unknown restaurant, or a storage error.
    pub fn check(
        &self,
        restaurant_id: RestaurantId,
        datetime: DateTime<Utc>,
        guests: u32,
    ) -> Result<AvailabilityReport> {
        self.check_guests(guests)?;
        let restaurant = self.restaurant(restaurant_id)?;
        let schedule = self.schedule(&restaurant, datetime.date_naive())?;
        let slots = SlotSequence::for_policy(&schedule, self.policy, restaurant.duration())?;

        let tables = Database::tables(self.conn, restaurant.id, guests)?;
        let bookings = TableBookings::fetch(self.conn, &restaurant, self.now)?;

        let mut report = AvailabilityReport {
            available_slots: Vec::new(),
            tables_available: 0,
            total_tables: tables.len(),
        };
        for slot in &slots {
            let free = self.free_count(&restaurant, &schedule, &tables, &bookings, slot);
            if free > 0 {
                report.available_slots.push(slot);
            }
            report.tables_available = report.tables_available.max(free);
        }

        log::debug!(
            "restaurant {}: {} slot(s) free on {} for {guests} guest(s)",
            restaurant.id,
            report.available_slots.len(),
            schedule.date()
        );
        Ok(report)
    }

    /// Availability of the slot starting at `time` on `date`.
    ///
    /// # Errors
    ///
    /// Same as [`AvailabilityEngine::check`].
    pub fn slot(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
        time: NaiveTime,
        guests: u32,
    ) -> Result<SlotAvailability> {
        self.check_guests(guests)?;
        let restaurant = self.restaurant(restaurant_id)?;
        let schedule = self.schedule(&restaurant, date)?;

        let tables = Database::tables(self.conn, restaurant.id, guests)?;
        let bookings = TableBookings::fetch(self.conn, &restaurant, self.now)?;
        let free = self.free_count(
            &restaurant,
            &schedule,
            &tables,
            &bookings,
            instant_on(date, time),
        );

        Ok(SlotAvailability {
            available: free > 0,
            tables_available: free,
            total_tables: tables.len(),
        })
    }

    /// Tables seating `guests` that are free for the slot starting at
    /// `time` on `date`, smallest first.
    ///
    /// Empty when the slot is in the past or the restaurant is not open
    /// for the whole reservation window.
    ///
    /// # Errors
    ///
    /// Same as [`AvailabilityEngine::check`].
    pub fn available_tables(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
        time: NaiveTime,
        guests: u32,
    ) -> Result<Vec<Table>> {
        self.check_guests(guests)?;
        let restaurant = self.restaurant(restaurant_id)?;
        let schedule = self.schedule(&restaurant, date)?;

        let start = instant_on(date, time);
        let window = restaurant.window_starting_at(start);
        if !self.bookable(&schedule, &window) {
            return Ok(Vec::new());
        }

        let detector = ConflictDetector::new(self.conn, self.now);
        let mut free = Vec::new();
        for table in Database::tables(self.conn, restaurant.id, guests)? {
            if detector.is_available(table.id, &window, restaurant.buffer())? {
                free.push(table);
            }
        }
        Ok(free)
    }

    /// Free windows on every table seating `guests` on `date`.
    ///
    /// # Errors
    ///
    /// Same as [`AvailabilityEngine::check`].
    pub fn alternative_slots(
        &self,
        restaurant_id: RestaurantId,
        date: NaiveDate,
        guests: u32,
    ) -> Result<Vec<TableGaps>> {
        self.check_guests(guests)?;
        let restaurant = self.restaurant(restaurant_id)?;
        let schedule = self.schedule(&restaurant, date)?;
        TableAllocator::new(self.conn, self.now).alternative_slots(&restaurant, &schedule, guests)
    }

    /// Free windows on one table on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown restaurant or a table of
    /// another restaurant, or a storage error.
    pub fn free_gaps(
        &self,
        restaurant_id: RestaurantId,
        table_id: TableId,
        date: NaiveDate,
    ) -> Result<TableGaps> {
        let restaurant = self.restaurant(restaurant_id)?;
        let table = Database::table(self.conn, restaurant.id, table_id)?
            .ok_or_else(|| Error::not_found(format!("table {table_id}")))?;
        let schedule = self.schedule(&restaurant, date)?;
        let gaps = TableAllocator::new(self.conn, self.now).free_gaps(&restaurant, table.id, &schedule)?;
        Ok(TableGaps { table, gaps })
    }

    fn check_guests(&self, guests: u32) -> Result<()> {
        match guest_count_problem(guests, self.policy.max_guests) {
            Some(reason) => Err(Error::InvalidRequest {
                reasons: vec![reason],
            }),
            None => Ok(()),
        }
    }

    fn restaurant(&self, restaurant_id: RestaurantId) -> Result<Restaurant> {
        Database::restaurant(self.conn, restaurant_id)?
            .ok_or_else(|| Error::not_found(format!("restaurant {restaurant_id}")))
    }

    fn schedule(&self, restaurant: &Restaurant, date: NaiveDate) -> Result<DaySchedule> {
        ScheduleResolver::new(self.conn).resolve(restaurant.id, date)
    }

    fn bookable(&self, schedule: &DaySchedule, window: &TimeWindow) -> bool {
        window.start > self.now && schedule.fits(window)
    }

    fn free_count(
        &self,
        restaurant: &Restaurant,
        schedule: &DaySchedule,
        tables: &[Table],
        bookings: &TableBookings,
        start: DateTime<Utc>,
    ) -> usize {
        let window = restaurant.window_starting_at(start);
        if !self.bookable(schedule, &window) {
            return 0;
        }
        tables
            .iter()
            .filter(|table| bookings.is_free(table.id, &window, restaurant.buffer()))
            .count()
    }
}
