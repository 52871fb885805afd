//! Database connection management.
//!
//! This module provides the main database connection type with the PRAGMA
//! settings needed for several processes booking against one file.

use rusqlite::{Connection, OpenFlags};

use crate::error::Result;

use super::config::DatabaseConfig;

/// A database connection wrapper with configuration.
///
/// Each thread or process opens its own `Database`; the booking insert runs
/// in an `IMMEDIATE` transaction so concurrent writers serialize on the file
/// lock and the exclusion triggers see every committed row.
///
/// # Examples
///
/// ```no_run
/// use tablebook::database::{Database, DatabaseConfig};
///
/// let config = DatabaseConfig::new("/tmp/tablebook.db");
/// let db = Database::open(config).unwrap();
/// ```
#[derive(Debug)]
pub struct Database {
    pub(super) conn: Connection,
    config: DatabaseConfig,
}

impl Database {
    /// Opens a database connection with the given configuration.
    ///
    /// This function will:
    /// - Create the parent directory if `auto_create` is enabled
    /// - Open the database with appropriate flags
    /// - Set WAL mode and the busy timeout
    /// - Enable foreign keys
    /// - Initialize or verify the database schema
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database file cannot be opened
    /// - The parent directory cannot be created
    /// - PRAGMA settings cannot be applied
    /// - Schema initialization or verification fails
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        if config.auto_create && !config.path.exists() {
            if let Some(parent) = config.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let flags = if config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else if config.auto_create {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };

        let conn = Connection::open_with_flags(&config.path, flags)?;

        // Busy timeout first: switching to WAL needs the write lock.
        conn.busy_timeout(config.busy_timeout)?;
        if !config.read_only {
            let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON")?;

        super::migrations::check_schema_compatibility(&conn)?;

        log::debug!("opened database at {}", config.path.display());
        Ok(Self { conn, config })
    }

    /// Returns a reference to the underlying `SQLite` connection.
    ///
    /// Read queries take a `&Connection` so they run equally against a
    /// plain connection or inside a transaction.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns a mutable reference to the underlying `SQLite` connection.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// The configuration this connection was opened with.
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Closes the connection, reporting any error from the final flush.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` refuses to close the handle.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }
}
