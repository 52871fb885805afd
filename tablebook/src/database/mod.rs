//! Database layer: the storage collaborator.
//!
//! This module provides a SQLite-based store for restaurants, tables,
//! schedules, clients and reservations, including connection management,
//! schema versioning, the buffered-overlap exclusion constraint and the
//! queries the engine needs.
//!
//! # Examples
//!
//! ```no_run
//! use tablebook::database::{Database, DatabaseConfig};
//!
//! let config = DatabaseConfig::new("/tmp/tablebook.db");
//! let db = Database::open(config).unwrap();
//!
//! let tables = Database::tables(db.connection(), 1, 4).unwrap();
//! for table in tables {
//!     println!("table {} seats {}", table.id, table.capacity);
//! }
//! ```

mod catalog;
mod clients;
mod config;
mod connection;
pub mod migrations;
mod operations;
mod reservations;
mod schema;

#[cfg(test)]
pub(crate) mod test_util;

pub use catalog::{Catalog, ExceptionEntry, ImportSummary, RestaurantEntry, TableEntry, WeeklyEntry};
pub use config::{
    default_data_dir, resolve_data_dir, resolve_database_path, DatabaseConfig, DATABASE_FILE_NAME,
};
pub use connection::Database;
pub use reservations::ReservationFilter;

// Re-export migration functions for advanced use cases
pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};
