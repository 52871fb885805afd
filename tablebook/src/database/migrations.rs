//! Database schema management and migrations.
//!
//! This module handles database schema initialization and version checking.

use rusqlite::Connection;

use crate::error::{Error, Result};

use super::schema::{
    CREATE_CLIENTS_TABLE, CREATE_DINING_TABLES_TABLE, CREATE_EXCEPTIONS_INDEX,
    CREATE_METADATA_TABLE, CREATE_OVERLAP_INSERT_TRIGGER, CREATE_OVERLAP_UPDATE_TRIGGER,
    CREATE_RESERVATIONS_RESTAURANT_INDEX, CREATE_RESERVATIONS_TABLE,
    CREATE_RESERVATIONS_TABLE_INDEX, CREATE_RESTAURANTS_TABLE, CREATE_SCHEDULES_INDEX,
    CREATE_SCHEDULE_EXCEPTIONS_TABLE, CREATE_TABLES_CAPACITY_INDEX, CREATE_WEEKLY_SCHEDULES_TABLE,
    CREATE_ZONES_TABLE, CURRENT_SCHEMA_VERSION, INSERT_SCHEMA_VERSION, SELECT_SCHEMA_VERSION,
};

/// Initializes the database schema.
///
/// Creates all tables, exclusion triggers, indices and the version row in a
/// single batch. It should only be called on a database that has not been
/// initialized yet.
///
/// # Errors
///
/// Returns an error if any SQL statement fails to execute.
///
/// # Examples
///
/// ```
/// use rusqlite::Connection;
/// use tablebook::database::migrations::{get_schema_version, initialize_schema};
///
/// let conn = Connection::open_in_memory().unwrap();
/// initialize_schema(&conn).unwrap();
/// assert_eq!(get_schema_version(&conn).unwrap(), 1);
/// ```
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let statements = [
        CREATE_METADATA_TABLE,
        CREATE_RESTAURANTS_TABLE,
        CREATE_ZONES_TABLE,
        CREATE_DINING_TABLES_TABLE,
        CREATE_WEEKLY_SCHEDULES_TABLE,
        CREATE_SCHEDULE_EXCEPTIONS_TABLE,
        CREATE_CLIENTS_TABLE,
        CREATE_RESERVATIONS_TABLE,
        CREATE_OVERLAP_INSERT_TRIGGER,
        CREATE_OVERLAP_UPDATE_TRIGGER,
        CREATE_RESERVATIONS_TABLE_INDEX,
        CREATE_RESERVATIONS_RESTAURANT_INDEX,
        CREATE_TABLES_CAPACITY_INDEX,
        CREATE_SCHEDULES_INDEX,
        CREATE_EXCEPTIONS_INDEX,
    ];

    // Triggers contain inner semicolons, so each statement is its own batch.
    for statement in statements {
        conn.execute_batch(statement)?;
    }

    conn.execute(INSERT_SCHEMA_VERSION, [CURRENT_SCHEMA_VERSION.to_string()])?;
    log::debug!("initialized schema version {CURRENT_SCHEMA_VERSION}");
    Ok(())
}

/// Gets the current schema version from the database.
///
/// # Errors
///
/// Returns an error if the query fails for reasons other than a missing
/// metadata table or version row (which indicate version 0).
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    match conn.query_row(SELECT_SCHEMA_VERSION, [], |row| {
        let value: String = row.get(0)?;
        value
            .parse::<i32>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(rusqlite::Error::SqliteFailure(_, Some(ref message)))
            if message.contains("no such table") =>
        {
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks schema compatibility and initializes if needed.
///
/// A fresh database is initialized; any other version than the current one
/// is rejected.
///
/// # Errors
///
/// Returns an error if the schema version is incompatible, or if
/// initialization or the version query fails.
pub fn check_schema_compatibility(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        initialize_schema(conn)?;
    } else if version != CURRENT_SCHEMA_VERSION {
        return Err(Error::UnsupportedSchemaVersion {
            expected: CURRENT_SCHEMA_VERSION,
            found: version,
        });
    }

    Ok(())
}
