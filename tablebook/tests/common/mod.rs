//! Shared fixtures for integration tests.
//!
//! Each [`TestStore`] owns a temporary directory holding one database file;
//! tests that exercise concurrency open one [`Database`] per thread on it.

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use tablebook::clock::FixedClock;
use tablebook::config::BookingPolicy;
use tablebook::database::Catalog;
use tablebook::identity::authenticate;
use tablebook::model::{NewClient, RestaurantId};
use tablebook::operations::{BookingOutcome, BookingRequest, BookingTransaction, ClientRef};
use tablebook::{Database, DatabaseConfig};
use tempfile::TempDir;

/// A database file seeded from a catalog document.
pub struct TestStore {
    _dir: TempDir,
    /// Path of the database file.
    pub path: PathBuf,
}

impl TestStore {
    /// Creates the database and imports `catalog_yaml` into it.
    pub fn with_catalog(catalog_yaml: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tablebook.db");
        let mut db = Database::open(DatabaseConfig::new(&path)).unwrap();
        db.import_catalog(&Catalog::from_yaml_str(catalog_yaml).unwrap())
            .unwrap();
        Self { _dir: dir, path }
    }

    /// Opens a new handle on the database file.
    pub fn open(&self) -> Database {
        Database::open(DatabaseConfig::new(&self.path)).unwrap()
    }

    /// The restaurant owning `api_key`.
    pub fn restaurant(&self, api_key: &str) -> RestaurantId {
        authenticate(self.open().connection(), api_key)
            .unwrap()
            .expect("api key should be known")
    }
}

/// A UTC instant.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

/// Inline client data with the given phone.
pub fn guest(phone: &str) -> ClientRef {
    ClientRef::Details(NewClient {
        name: "Test Guest".into(),
        phone: phone.into(),
        email: None,
    })
}

/// Runs one booking as of `now` with the default policy.
pub fn book(
    db: &mut Database,
    now: DateTime<Utc>,
    restaurant_id: RestaurantId,
    start: DateTime<Utc>,
    guests: u32,
    client: ClientRef,
) -> BookingOutcome {
    let policy = BookingPolicy::default();
    let clock = FixedClock::new(now);
    let request = BookingRequest::new(restaurant_id, start.to_rfc3339(), guests, client);
    BookingTransaction::new(db, &policy, &clock)
        .execute(&request)
        .unwrap()
}
