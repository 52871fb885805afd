//! Reservation storage: the guarded insert and the conflict queries.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};

use crate::error::{Error, Result};
use crate::model::{
    instant_on, NewReservation, Reservation, ReservationId, RestaurantId, TableId,
};

use super::connection::Database;
use super::operations::{from_unix_secs, to_unix_secs};
use super::schema::OVERLAP_CONSTRAINT;

/// Filter for [`Database::list_reservations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    /// Only reservations starting on or after the start of this date.
    pub from_date: Option<NaiveDate>,
    /// Only reservations on this table.
    pub table_id: Option<TableId>,
}

const COLUMNS: &str =
    "id, restaurant_id, table_id, client_id, start_time, end_time, guests, confirmed, notes";

/// Expects row fields in [`COLUMNS`] order.
fn row_to_reservation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reservation> {
    Ok(Reservation {
        id: row.get(0)?,
        restaurant_id: row.get(1)?,
        table_id: row.get(2)?,
        client_id: row.get(3)?,
        start_time: from_unix_secs(4, row.get(4)?)?,
        end_time: from_unix_secs(5, row.get(5)?)?,
        guests: row.get(6)?,
        confirmed: row.get(7)?,
        notes: row.get(8)?,
    })
}

const INSERT_RESERVATION: &str = r"
    INSERT INTO reservations
    (restaurant_id, table_id, client_id, start_time, end_time, guests, confirmed, notes, created_at)
    VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
";

/// Whether `err` is the exclusion trigger's abort.
fn is_overlap_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == ErrorCode::ConstraintViolation
                && message.contains(OVERLAP_CONSTRAINT)
    )
}

fn collect(conn: &Connection, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Reservation>> {
    let mut stmt = conn.prepare(sql)?;
    let reservations = stmt
        .query_map(params, row_to_reservation)?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(reservations)
}

impl Database {
    /// Inserts a confirmed reservation.
    ///
    /// The insert runs in an `IMMEDIATE` transaction and is checked by the
    /// exclusion trigger against every committed confirmed reservation on the
    /// same table, widened by the restaurant's buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableNoLongerAvailable`] if the trigger rejects the
    /// row, or a database error for any other failure.
    pub fn insert_reservation(
        &mut self,
        reservation: &NewReservation,
        created_at: DateTime<Utc>,
    ) -> Result<Reservation> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
            INSERT_RESERVATION,
            params![
                reservation.restaurant_id,
                reservation.table_id,
                reservation.client_id,
                to_unix_secs(reservation.window.start),
                to_unix_secs(reservation.window.end),
                reservation.guests,
                reservation.notes,
                to_unix_secs(created_at),
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(ref e) if is_overlap_violation(e) => {
                log::warn!(
                    "exclusion constraint rejected table {} for {}",
                    reservation.table_id,
                    reservation.window
                );
                return Err(Error::TableNoLongerAvailable {
                    table_id: reservation.table_id,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Reservation {
            id,
            restaurant_id: reservation.restaurant_id,
            table_id: reservation.table_id,
            client_id: reservation.client_id,
            start_time: reservation.window.start,
            end_time: reservation.window.end,
            guests: reservation.guests,
            confirmed: true,
            notes: reservation.notes.clone(),
        })
    }

    /// Looks up a reservation of a restaurant by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn reservation(
        conn: &Connection,
        restaurant_id: RestaurantId,
        id: ReservationId,
    ) -> Result<Option<Reservation>> {
        let sql = format!("SELECT {COLUMNS} FROM reservations WHERE restaurant_id = ? AND id = ?");
        let reservation = conn
            .query_row(&sql, params![restaurant_id, id], row_to_reservation)
            .optional()?;
        Ok(reservation)
    }

    /// Confirmed reservations on a table ending at or after `cutoff`,
    /// ordered by start time.
    ///
    /// Conflict checks pass `now - buffer` so a reservation that just ended
    /// still counts until its buffer has run out.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn active_reservations_for_table(
        conn: &Connection,
        table_id: TableId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Reservation>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM reservations
             WHERE table_id = ? AND confirmed = 1 AND end_time >= ?
             ORDER BY start_time, id"
        );
        collect(conn, &sql, params![table_id, to_unix_secs(cutoff)])
    }

    /// Confirmed reservations of a restaurant ending at or after `cutoff`,
    /// across all tables, ordered by table then start time.
    ///
    /// Availability queries fetch once per request with this and group by
    /// table instead of querying per table and slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn active_reservations_for_restaurant(
        conn: &Connection,
        restaurant_id: RestaurantId,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Reservation>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM reservations
             WHERE restaurant_id = ? AND confirmed = 1 AND end_time >= ?
             ORDER BY table_id, start_time, id"
        );
        collect(conn, &sql, params![restaurant_id, to_unix_secs(cutoff)])
    }

    /// Confirmed reservations on a table that touch `date` (UTC) once
    /// widened by `buffer`, ordered by start time.
    ///
    /// A reservation ending just before midnight still blocks the first
    /// `buffer` of the next day.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn reservations_for_table_on(
        conn: &Connection,
        table_id: TableId,
        date: NaiveDate,
        buffer: Duration,
    ) -> Result<Vec<Reservation>> {
        let day_start = instant_on(date, NaiveTime::default()) - buffer;
        let day_end = instant_on(date, NaiveTime::default()) + Duration::days(1) + buffer;
        let sql = format!(
            "SELECT {COLUMNS} FROM reservations
             WHERE table_id = ? AND confirmed = 1 AND start_time < ? AND end_time > ?
             ORDER BY start_time, id"
        );
        collect(
            conn,
            &sql,
            params![table_id, to_unix_secs(day_end), to_unix_secs(day_start)],
        )
    }

    /// Confirmed reservations of a restaurant matching `filter`, ordered by
    /// start time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_reservations(
        conn: &Connection,
        restaurant_id: RestaurantId,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>> {
        let from = filter
            .from_date
            .map(|date| to_unix_secs(instant_on(date, NaiveTime::default())));
        let sql = format!(
            "SELECT {COLUMNS} FROM reservations
             WHERE restaurant_id = ?1 AND confirmed = 1
               AND (?2 IS NULL OR start_time >= ?2)
               AND (?3 IS NULL OR table_id = ?3)
             ORDER BY start_time, id"
        );
        collect(conn, &sql, params![restaurant_id, from, filter.table_id])
    }
}
