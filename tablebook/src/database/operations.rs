//! Read operations for restaurant reference data.
//!
//! Restaurants, tables and schedules are written only by catalog import;
//! the engine reads them through the associated functions below, which take
//! a `&Connection` so they work inside a transaction as well.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::model::{
    Restaurant, RestaurantId, ScheduleException, Table, TableId, WeeklyScheduleEntry,
};

use super::connection::Database;

const TIME_FORMAT: &str = "%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts an instant to Unix epoch seconds for database storage.
pub(super) fn to_unix_secs(instant: DateTime<Utc>) -> i64 {
    instant.timestamp()
}

/// Converts Unix epoch seconds read from column `idx` back to an instant.
pub(super) fn from_unix_secs(idx: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, secs))
}

pub(super) fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub(super) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_stored_time(idx: usize, text: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_stored_date(idx: usize, text: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_restaurant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Restaurant> {
    Ok(Restaurant {
        id: row.get(0)?,
        name: row.get(1)?,
        reservation_duration: row.get(2)?,
        buffer_time: row.get(3)?,
    })
}

/// Expects row fields in this order: id, `restaurant_id`, capacity, `zone_id`
pub(super) fn row_to_table(row: &rusqlite::Row<'_>) -> rusqlite::Result<Table> {
    Ok(Table {
        id: row.get(0)?,
        restaurant_id: row.get(1)?,
        capacity: row.get(2)?,
        zone_id: row.get(3)?,
    })
}

const SELECT_RESTAURANT: &str = r"
    SELECT id, name, reservation_duration, buffer_time
    FROM restaurants
    WHERE id = ?
";

const SELECT_RESTAURANT_BY_API_KEY: &str = r"
    SELECT id FROM restaurants WHERE api_key = ?
";

const SELECT_TABLES_WITH_CAPACITY: &str = r"
    SELECT id, restaurant_id, capacity, zone_id
    FROM dining_tables
    WHERE restaurant_id = ? AND capacity >= ?
    ORDER BY capacity, id
";

const COUNT_TABLES_WITH_CAPACITY: &str = r"
    SELECT COUNT(*) FROM dining_tables WHERE restaurant_id = ? AND capacity >= ?
";

const SELECT_TABLE: &str = r"
    SELECT id, restaurant_id, capacity, zone_id
    FROM dining_tables
    WHERE restaurant_id = ? AND id = ?
";

const SELECT_WEEKLY_SCHEDULE: &str = r"
    SELECT restaurant_id, day_of_week, opening_time, closing_time
    FROM weekly_schedules
    WHERE restaurant_id = ? AND day_of_week = ?
    ORDER BY opening_time
";

const SELECT_SCHEDULE_EXCEPTIONS: &str = r"
    SELECT restaurant_id, date, opening_time, closing_time, description
    FROM schedule_exceptions
    WHERE restaurant_id = ? AND date = ?
    ORDER BY opening_time
";

impl Database {
    /// Looks up a restaurant by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tablebook::database::{Database, DatabaseConfig};
    ///
    /// let db = Database::open(DatabaseConfig::new("/tmp/tablebook.db")).unwrap();
    /// if let Some(restaurant) = Database::restaurant(db.connection(), 1).unwrap() {
    ///     println!("{} books {} minute slots", restaurant.name, restaurant.reservation_duration);
    /// }
    /// ```
    pub fn restaurant(conn: &Connection, id: RestaurantId) -> Result<Option<Restaurant>> {
        let restaurant = conn
            .query_row(SELECT_RESTAURANT, [id], row_to_restaurant)
            .optional()?;
        Ok(restaurant)
    }

    /// Resolves an API key to the restaurant it belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn restaurant_by_api_key(conn: &Connection, api_key: &str) -> Result<Option<RestaurantId>> {
        let id = conn
            .query_row(SELECT_RESTAURANT_BY_API_KEY, [api_key], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    /// Lists a restaurant's tables seating at least `min_capacity` guests,
    /// ordered by capacity then id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn tables(
        conn: &Connection,
        restaurant_id: RestaurantId,
        min_capacity: u32,
    ) -> Result<Vec<Table>> {
        let mut stmt = conn.prepare(SELECT_TABLES_WITH_CAPACITY)?;
        let tables = stmt
            .query_map(params![restaurant_id, min_capacity], row_to_table)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(tables)
    }

    /// Counts a restaurant's tables seating at least `min_capacity` guests.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_tables(
        conn: &Connection,
        restaurant_id: RestaurantId,
        min_capacity: u32,
    ) -> Result<usize> {
        let count: i64 = conn.query_row(
            COUNT_TABLES_WITH_CAPACITY,
            params![restaurant_id, min_capacity],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Looks up one table, scoped to its restaurant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn table(
        conn: &Connection,
        restaurant_id: RestaurantId,
        table_id: TableId,
    ) -> Result<Option<Table>> {
        let table = conn
            .query_row(SELECT_TABLE, params![restaurant_id, table_id], row_to_table)
            .optional()?;
        Ok(table)
    }

    /// Weekly schedule rows for one weekday (0 = Sunday), by opening time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a stored time is
    /// malformed.
    pub fn weekly_schedule(
        conn: &Connection,
        restaurant_id: RestaurantId,
        day_of_week: u8,
    ) -> Result<Vec<WeeklyScheduleEntry>> {
        let mut stmt = conn.prepare(SELECT_WEEKLY_SCHEDULE)?;
        let entries = stmt
            .query_map(params![restaurant_id, day_of_week], |row| {
                let opening: String = row.get(2)?;
                let closing: String = row.get(3)?;
                Ok(WeeklyScheduleEntry {
                    restaurant_id: row.get(0)?,
                    day_of_week: row.get(1)?,
                    opening_time: parse_stored_time(2, &opening)?,
                    closing_time: parse_stored_time(3, &closing)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(entries)
    }

    /// Exception rows for one date; empty when the weekly schedule applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a stored value is
    /// malformed.
    pub fn schedule_exceptions(
        conn: &Connection,
        restaurant_id: RestaurantId,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleException>> {
        let mut stmt = conn.prepare(SELECT_SCHEDULE_EXCEPTIONS)?;
        let exceptions = stmt
            .query_map(params![restaurant_id, format_date(date)], |row| {
                let date: String = row.get(1)?;
                let opening: Option<String> = row.get(2)?;
                let closing: Option<String> = row.get(3)?;
                Ok(ScheduleException {
                    restaurant_id: row.get(0)?,
                    date: parse_stored_date(1, &date)?,
                    opening_time: opening.map(|t| parse_stored_time(2, &t)).transpose()?,
                    closing_time: closing.map(|t| parse_stored_time(3, &t)).transpose()?,
                    description: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(exceptions)
    }
}
