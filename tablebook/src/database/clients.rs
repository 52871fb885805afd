//! Client record storage.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::model::{Client, ClientId, NewClient};

use super::connection::Database;
use super::operations::to_unix_secs;

const SELECT_CLIENT: &str = "SELECT id, name, phone, email FROM clients WHERE id = ?";
const SELECT_CLIENT_BY_PHONE: &str = "SELECT id, name, phone, email FROM clients WHERE phone = ?";
const SELECT_CLIENT_BY_EMAIL: &str = "SELECT id, name, phone, email FROM clients WHERE email = ?";

const INSERT_CLIENT: &str = r"
    INSERT INTO clients (name, phone, email, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?)
";

fn row_to_client(row: &rusqlite::Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
    })
}

/// Maps a UNIQUE violation on `clients` to the column it hit.
fn duplicate_column(err: &rusqlite::Error) -> Option<&'static str> {
    match err {
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            if message.contains("clients.phone") {
                Some("phone")
            } else if message.contains("clients.email") {
                Some("email")
            } else {
                None
            }
        }
        _ => None,
    }
}

impl Database {
    /// Looks up a client by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn client(conn: &Connection, id: ClientId) -> Result<Option<Client>> {
        Ok(conn.query_row(SELECT_CLIENT, [id], row_to_client).optional()?)
    }

    /// Looks up a client by normalized phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn client_by_phone(conn: &Connection, phone: &str) -> Result<Option<Client>> {
        Ok(conn
            .query_row(SELECT_CLIENT_BY_PHONE, [phone], row_to_client)
            .optional()?)
    }

    /// Looks up a client by e-mail address.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn client_by_email(conn: &Connection, email: &str) -> Result<Option<Client>> {
        Ok(conn
            .query_row(SELECT_CLIENT_BY_EMAIL, [email], row_to_client)
            .optional()?)
    }

    /// Inserts a client whose fields are already validated and normalized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateClient`] if the phone or e-mail is already
    /// taken, or a database error for any other failure.
    pub fn insert_client(&mut self, client: &NewClient, now: DateTime<Utc>) -> Result<Client> {
        let secs = to_unix_secs(now);
        let inserted = self.conn.execute(
            INSERT_CLIENT,
            params![client.name, client.phone, client.email, secs, secs],
        );

        if let Err(ref e) = inserted {
            if let Some(field) = duplicate_column(e) {
                let value = match field {
                    "email" => client.email.clone().unwrap_or_default(),
                    _ => client.phone.clone(),
                };
                return Err(Error::DuplicateClient {
                    field: field.into(),
                    value,
                });
            }
        }
        inserted?;

        Ok(Client {
            id: self.conn.last_insert_rowid(),
            name: client.name.clone(),
            phone: client.phone.clone(),
            email: client.email.clone(),
        })
    }
}
