//! Shared test utilities for unit tests.
//!
//! This module provides helper functions used across multiple test modules.

use chrono::{DateTime, Duration, Utc};
use tempfile::tempdir;

use crate::database::catalog::{Catalog, RestaurantEntry, TableEntry, WeeklyEntry};
use crate::database::{Database, DatabaseConfig};
use crate::model::{ClientId, NewClient, NewReservation, RestaurantId, TableId, TimeWindow};

/// Creates a temporary test database that will be cleaned up automatically.
///
/// # Panics
///
/// Panics if the temporary directory or database cannot be created.
/// This is acceptable in test code where we want to fail fast.
#[must_use]
pub fn create_test_database() -> Database {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::open(DatabaseConfig::new(path)).unwrap();

    // Prevent the TempDir from being dropped immediately
    std::mem::forget(dir);

    db
}

/// Seeds a restaurant with the given tables and weekly intervals
/// `(day_of_week, "HH:MM", "HH:MM")`. Its API key is `key-{id}`.
///
/// # Panics
///
/// Panics if the import fails.
pub fn seed_restaurant(
    db: &mut Database,
    reservation_duration: u32,
    buffer_time: u32,
    capacities: &[u32],
    weekly: &[(u8, &str, &str)],
) -> RestaurantId {
    let next_id: RestaurantId = db
        .connection()
        .query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM restaurants", [], |row| {
            row.get(0)
        })
        .unwrap();

    let entry = RestaurantEntry {
        id: Some(next_id),
        name: format!("Restaurant {next_id}"),
        api_key: format!("key-{next_id}"),
        reservation_duration,
        buffer_time,
        zones: Vec::new(),
        tables: capacities
            .iter()
            .map(|&capacity| TableEntry {
                id: None,
                capacity,
                zone: None,
            })
            .collect(),
        weekly_schedule: weekly
            .iter()
            .map(|&(day_of_week, opening, closing)| WeeklyEntry {
                day_of_week,
                opening_time: opening.into(),
                closing_time: closing.into(),
            })
            .collect(),
        exceptions: Vec::new(),
    };

    let summary = db
        .import_catalog(&Catalog {
            restaurants: vec![entry],
        })
        .unwrap();
    summary.restaurants[0]
}

/// Adds a schedule exception; `None` hours mark the date closed.
///
/// # Panics
///
/// Panics if the insert fails.
pub fn seed_exception(
    db: &mut Database,
    restaurant_id: RestaurantId,
    date: &str,
    hours: Option<(&str, &str)>,
) {
    let entry = crate::database::catalog::ExceptionEntry {
        date: date.into(),
        opening_time: hours.map(|(opening, _)| opening.into()),
        closing_time: hours.map(|(_, closing)| closing.into()),
        description: None,
    };
    crate::database::catalog::insert_exception(db.connection(), restaurant_id, &entry).unwrap();
}

/// Creates a client with the given normalized phone.
///
/// # Panics
///
/// Panics if the insert fails.
pub fn seed_client(db: &mut Database, phone: &str) -> ClientId {
    db.insert_client(
        &NewClient {
            name: "Test Client".into(),
            phone: phone.into(),
            email: None,
        },
        Utc::now(),
    )
    .unwrap()
    .id
}

/// A two-guest reservation of `minutes` starting at `start`.
#[must_use]
pub fn new_reservation(
    restaurant_id: RestaurantId,
    table_id: TableId,
    client_id: ClientId,
    start: DateTime<Utc>,
    minutes: i64,
) -> NewReservation {
    NewReservation {
        restaurant_id,
        table_id,
        client_id,
        window: TimeWindow::starting_at(start, Duration::minutes(minutes)),
        guests: 2,
        notes: None,
    }
}
