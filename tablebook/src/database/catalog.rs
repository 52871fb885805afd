//! Catalog import: the configuration collaborator's write path.
//!
//! A catalog is a YAML document describing restaurants with their zones,
//! tables, weekly schedules and schedule exceptions. The engine itself never
//! writes reference data; only [`Database::import_catalog`] does.
//!
//! ```yaml
//! restaurants:
//!   - name: Bistro
//!     api_key: bistro-secret
//!     reservation_duration: 90
//!     buffer_time: 15
//!     zones: [terrace]
//!     tables:
//!       - capacity: 2
//!       - capacity: 4
//!         zone: terrace
//!     weekly_schedule:
//!       - { day_of_week: 1, opening_time: "12:00", closing_time: "15:00" }
//!       - { day_of_week: 1, opening_time: "19:00", closing_time: "23:00" }
//!     exceptions:
//!       - { date: "2024-12-25", description: Christmas }
//! ```

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{parse_date, parse_time_of_day, RestaurantId, TableId, ZoneId};

use super::connection::Database;
use super::operations::{format_date, format_time};

/// A catalog document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    /// Restaurants to create or update.
    #[serde(default)]
    pub restaurants: Vec<RestaurantEntry>,
}

/// One restaurant in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestaurantEntry {
    /// Explicit id; assigned by the database when absent.
    #[serde(default)]
    pub id: Option<RestaurantId>,
    /// Display name.
    pub name: String,
    /// Credential the identity collaborator resolves to this restaurant.
    pub api_key: String,
    /// Reservation length in minutes.
    pub reservation_duration: u32,
    /// Buffer around each reservation in minutes.
    #[serde(default)]
    pub buffer_time: u32,
    /// Zone names referenced by tables.
    #[serde(default)]
    pub zones: Vec<String>,
    /// Tables; entries without an id are always added.
    #[serde(default)]
    pub tables: Vec<TableEntry>,
    /// Replaces the stored weekly schedule.
    #[serde(default)]
    pub weekly_schedule: Vec<WeeklyEntry>,
    /// Replaces the stored schedule exceptions.
    #[serde(default)]
    pub exceptions: Vec<ExceptionEntry>,
}

/// One table in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableEntry {
    /// Explicit id; an existing table with this id is updated.
    #[serde(default)]
    pub id: Option<TableId>,
    /// Number of seats.
    pub capacity: u32,
    /// Zone name, which must be listed in the restaurant's `zones`.
    #[serde(default)]
    pub zone: Option<String>,
}

/// One weekly opening interval in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeeklyEntry {
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: u8,
    /// `HH:MM`.
    pub opening_time: String,
    /// `HH:MM`.
    pub closing_time: String,
}

/// One schedule exception in a catalog. Omitting both times closes the date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExceptionEntry {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`, if open.
    #[serde(default)]
    pub opening_time: Option<String>,
    /// `HH:MM`, if open.
    #[serde(default)]
    pub closing_time: Option<String>,
    /// Free-form reason.
    #[serde(default)]
    pub description: Option<String>,
}

/// Counts of rows written by an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Ids of the imported restaurants, in document order.
    pub restaurants: Vec<RestaurantId>,
    /// Tables created or updated.
    pub tables: usize,
    /// Weekly schedule rows written.
    pub schedule_entries: usize,
    /// Exception rows written.
    pub exceptions: usize,
}

impl Catalog {
    /// Parses a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid catalog.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

fn invalid(field: &str, message: impl Into<String>) -> Error {
    Error::Validation {
        field: field.into(),
        message: message.into(),
    }
}

fn check_interval(opening: NaiveTime, closing: NaiveTime) -> Result<()> {
    if closing <= opening {
        return Err(invalid(
            "closing_time",
            format!("closing time {closing} must be after opening time {opening}"),
        ));
    }
    Ok(())
}

impl WeeklyEntry {
    fn parse(&self) -> Result<(u8, NaiveTime, NaiveTime)> {
        if self.day_of_week > 6 {
            return Err(invalid("day_of_week", "day of week must be between 0 and 6"));
        }
        let opening = parse_time_of_day("opening_time", &self.opening_time)?;
        let closing = parse_time_of_day("closing_time", &self.closing_time)?;
        check_interval(opening, closing)?;
        Ok((self.day_of_week, opening, closing))
    }
}

impl ExceptionEntry {
    fn parse(&self) -> Result<(NaiveDate, Option<(NaiveTime, NaiveTime)>)> {
        let date = parse_date("date", &self.date)?;
        let hours = match (&self.opening_time, &self.closing_time) {
            (None, None) => None,
            (Some(opening), Some(closing)) => {
                let opening = parse_time_of_day("opening_time", opening)?;
                let closing = parse_time_of_day("closing_time", closing)?;
                check_interval(opening, closing)?;
                Some((opening, closing))
            }
            _ => {
                return Err(invalid(
                    "exceptions",
                    format!("exception on {date} needs both opening and closing time, or neither"),
                ))
            }
        };
        Ok((date, hours))
    }
}

impl RestaurantEntry {
    /// Checks the entry before anything is written.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("name", "restaurant name must not be empty"));
        }
        if self.api_key.trim().is_empty() {
            return Err(invalid("api_key", "api key must not be empty"));
        }
        if self.reservation_duration == 0 {
            return Err(invalid(
                "reservation_duration",
                "reservation duration must be greater than 0",
            ));
        }
        for table in &self.tables {
            if table.capacity == 0 {
                return Err(invalid("capacity", "table capacity must be at least 1"));
            }
            if let Some(zone) = &table.zone {
                if !self.zones.contains(zone) {
                    return Err(invalid("zone", format!("unknown zone '{zone}'")));
                }
            }
        }
        for entry in &self.weekly_schedule {
            entry.parse()?;
        }
        for exception in &self.exceptions {
            exception.parse()?;
        }
        Ok(())
    }
}

const UPSERT_RESTAURANT: &str = r"
    INSERT INTO restaurants (id, name, api_key, reservation_duration, buffer_time)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT(api_key) DO UPDATE SET
        name = excluded.name,
        reservation_duration = excluded.reservation_duration,
        buffer_time = excluded.buffer_time
    RETURNING id
";

const UPSERT_ZONE: &str = r"
    INSERT INTO zones (restaurant_id, name) VALUES (?, ?)
    ON CONFLICT(restaurant_id, name) DO UPDATE SET name = excluded.name
    RETURNING id
";

const UPSERT_TABLE: &str = r"
    INSERT INTO dining_tables (id, restaurant_id, capacity, zone_id)
    VALUES (?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        capacity = excluded.capacity,
        zone_id = excluded.zone_id
";

const INSERT_WEEKLY: &str = r"
    INSERT INTO weekly_schedules (restaurant_id, day_of_week, opening_time, closing_time)
    VALUES (?, ?, ?, ?)
";

const INSERT_EXCEPTION: &str = r"
    INSERT INTO schedule_exceptions (restaurant_id, date, opening_time, closing_time, description)
    VALUES (?, ?, ?, ?, ?)
";

/// Writes one weekly interval.
pub(super) fn insert_weekly(
    conn: &Connection,
    restaurant_id: RestaurantId,
    entry: &WeeklyEntry,
) -> Result<()> {
    let (day, opening, closing) = entry.parse()?;
    conn.execute(
        INSERT_WEEKLY,
        params![restaurant_id, day, format_time(opening), format_time(closing)],
    )?;
    Ok(())
}

/// Writes one exception row.
pub(super) fn insert_exception(
    conn: &Connection,
    restaurant_id: RestaurantId,
    entry: &ExceptionEntry,
) -> Result<()> {
    let (date, hours) = entry.parse()?;
    conn.execute(
        INSERT_EXCEPTION,
        params![
            restaurant_id,
            format_date(date),
            hours.map(|(opening, _)| format_time(opening)),
            hours.map(|(_, closing)| format_time(closing)),
            entry.description,
        ],
    )?;
    Ok(())
}

fn import_restaurant(
    conn: &Connection,
    entry: &RestaurantEntry,
    summary: &mut ImportSummary,
) -> Result<()> {
    let restaurant_id: RestaurantId = conn.query_row(
        UPSERT_RESTAURANT,
        params![
            entry.id,
            entry.name.trim(),
            entry.api_key,
            entry.reservation_duration,
            entry.buffer_time,
        ],
        |row| row.get(0),
    )?;

    let mut zones: HashMap<&str, ZoneId> = HashMap::new();
    for name in &entry.zones {
        let zone_id = conn.query_row(UPSERT_ZONE, params![restaurant_id, name], |row| row.get(0))?;
        zones.insert(name.as_str(), zone_id);
    }

    for table in &entry.tables {
        let zone_id = table.zone.as_deref().and_then(|name| zones.get(name).copied());
        conn.execute(
            UPSERT_TABLE,
            params![table.id, restaurant_id, table.capacity, zone_id],
        )?;
        summary.tables += 1;
    }

    conn.execute(
        "DELETE FROM weekly_schedules WHERE restaurant_id = ?",
        [restaurant_id],
    )?;
    for weekly in &entry.weekly_schedule {
        insert_weekly(conn, restaurant_id, weekly)?;
        summary.schedule_entries += 1;
    }

    conn.execute(
        "DELETE FROM schedule_exceptions WHERE restaurant_id = ?",
        [restaurant_id],
    )?;
    for exception in &entry.exceptions {
        insert_exception(conn, restaurant_id, exception)?;
        summary.exceptions += 1;
    }

    log::info!(
        "imported restaurant {restaurant_id} ({}) with {} tables",
        entry.name,
        entry.tables.len()
    );
    summary.restaurants.push(restaurant_id);
    Ok(())
}

impl Database {
    /// Creates or updates every restaurant in the catalog in one transaction.
    ///
    /// Restaurants are matched on their API key. Weekly schedules and
    /// exceptions are replaced wholesale; tables with an id are updated in
    /// place and tables without one are added.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry is invalid or a write fails; nothing is
    /// written in that case.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tablebook::database::{Catalog, Database, DatabaseConfig};
    ///
    /// let mut db = Database::open(DatabaseConfig::new("/tmp/tablebook.db")).unwrap();
    /// let catalog = Catalog::from_yaml_str(
    ///     "restaurants:\n  - name: Bistro\n    api_key: k\n    reservation_duration: 60\n",
    /// )
    /// .unwrap();
    /// let summary = db.import_catalog(&catalog).unwrap();
    /// assert_eq!(summary.restaurants.len(), 1);
    /// ```
    pub fn import_catalog(&mut self, catalog: &Catalog) -> Result<ImportSummary> {
        for entry in &catalog.restaurants {
            entry.validate()?;
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut summary = ImportSummary::default();
        for entry in &catalog.restaurants {
            import_restaurant(&tx, entry, &mut summary)?;
        }
        tx.commit()?;

        Ok(summary)
    }
}
