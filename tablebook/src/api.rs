//! Request and response bodies for the thin handlers in front of the core.
//!
//! Requests arrive as loosely typed JSON or query strings and are converted
//! into the typed operation inputs here; responses are wrapped in
//! [`Success`] and failures in [`ErrorEnvelope`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::model::{
    parse_date, parse_instant, parse_time_of_day, Client, ClientId, NewClient, Reservation,
    ReservationId, RestaurantId, Table, TableId, ZoneId,
};
use crate::operations::{Booking, BookingRequest, ClientRef};

/// Status of a successful read.
pub const STATUS_OK: u16 = 200;
/// Status of a successful booking.
pub const STATUS_CREATED: u16 = 201;

/// `GET availability?datetime&guests`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AvailabilityQuery {
    /// RFC 3339 instant on the day to inspect.
    pub datetime: String,
    /// Party size.
    pub guests: u32,
}

impl AvailabilityQuery {
    /// The parsed instant.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `datetime` is malformed.
    pub fn instant(&self) -> Result<DateTime<Utc>> {
        parse_instant("datetime", &self.datetime)
    }
}

/// `GET available-tables?date&time&guests`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AvailableTablesQuery {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    /// Party size.
    pub guests: u32,
}

impl AvailableTablesQuery {
    /// The parsed date and time of day.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either value is malformed.
    pub fn slot(&self) -> Result<(NaiveDate, NaiveTime)> {
        Ok((
            parse_date("date", &self.date)?,
            parse_time_of_day("time", &self.time)?,
        ))
    }
}

/// Inline client data of a reservation request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientPayload {
    /// Full name.
    pub name: String,
    /// Phone number in any common formatting.
    pub phone: String,
    /// Optional e-mail address.
    #[serde(default)]
    pub email: Option<String>,
}

/// `POST reservations`
///
/// # Examples
///
/// ```
/// use tablebook::api::ReservationPayload;
/// use tablebook::operations::ClientRef;
///
/// let payload: ReservationPayload = serde_json::from_str(
///     r#"{"start_time": "2030-03-04T19:00:00Z", "guests": 2, "client_id": 5}"#,
/// )
/// .unwrap();
/// let request = payload.into_request(1).unwrap();
/// assert_eq!(request.client, ClientRef::Existing(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReservationPayload {
    /// RFC 3339 start instant.
    pub start_time: String,
    /// Party size.
    pub guests: u32,
    /// An existing client.
    #[serde(default)]
    pub client_id: Option<ClientId>,
    /// Inline client data, used when `client_id` is absent.
    #[serde(default)]
    pub client: Option<ClientPayload>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReservationPayload {
    /// Builds the booking request for `restaurant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] unless exactly one of `client_id`
    /// and `client` is given.
    pub fn into_request(self, restaurant_id: RestaurantId) -> Result<BookingRequest> {
        let client = match (self.client_id, self.client) {
            (Some(id), None) => ClientRef::Existing(id),
            (None, Some(client)) => ClientRef::Details(NewClient {
                name: client.name,
                phone: client.phone,
                email: client.email,
            }),
            (Some(_), Some(_)) => {
                return Err(Error::InvalidRequest {
                    reasons: vec!["Provide either client_id or client, not both".into()],
                })
            }
            (None, None) => {
                return Err(Error::InvalidRequest {
                    reasons: vec!["Either client_id or client details are required".into()],
                })
            }
        };
        Ok(
            BookingRequest::new(restaurant_id, self.start_time, self.guests, client)
                .with_notes(self.notes),
        )
    }
}

/// A table as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    /// Table id.
    pub id: TableId,
    /// Seats.
    pub capacity: u32,
    /// Zone, if any.
    pub zone_id: Option<ZoneId>,
}

impl From<&Table> for TableSummary {
    fn from(table: &Table) -> Self {
        Self {
            id: table.id,
            capacity: table.capacity,
            zone_id: table.zone_id,
        }
    }
}

/// A stored reservation as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationBody {
    /// Reservation id.
    pub id: ReservationId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Assigned table.
    pub table_id: TableId,
    /// Client the reservation is for.
    pub client_id: ClientId,
    /// Inclusive start.
    pub start_time: DateTime<Utc>,
    /// Exclusive end.
    pub end_time: DateTime<Utc>,
    /// Party size.
    pub guests: u32,
    /// Whether it counts for conflicts.
    pub confirmed: bool,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl From<&Reservation> for ReservationBody {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id,
            restaurant_id: r.restaurant_id,
            table_id: r.table_id,
            client_id: r.client_id,
            start_time: r.start_time,
            end_time: r.end_time,
            guests: r.guests,
            confirmed: r.confirmed,
            notes: r.notes.clone(),
        }
    }
}

/// A client as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientBody {
    /// Client id.
    pub id: ClientId,
    /// Full name.
    pub name: String,
    /// Normalized phone.
    pub phone: String,
    /// E-mail, if known.
    pub email: Option<String>,
}

impl From<&Client> for ClientBody {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id,
            name: client.name.clone(),
            phone: client.phone.clone(),
            email: client.email.clone(),
        }
    }
}

/// Response body of a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingBody {
    /// The stored reservation.
    pub reservation: ReservationBody,
    /// The allocated table.
    pub table: TableSummary,
    /// The client, echoed when it was given inline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientBody>,
}

impl BookingBody {
    /// Builds the body; `echo_client` controls whether the client is included.
    #[must_use]
    pub fn new(booking: &Booking, echo_client: bool) -> Self {
        Self {
            reservation: ReservationBody::from(&booking.reservation),
            table: TableSummary::from(&booking.table),
            client: echo_client.then(|| ClientBody::from(&booking.client)),
        }
    }
}

/// `{success: true, data}` wrapper of successful responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Success<T> {
    /// Always `true`.
    pub success: bool,
    /// The payload.
    pub data: T,
}

impl<T: Serialize> Success<T> {
    /// Wraps `data`.
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{error, message, details?}` body of failed responses.
///
/// # Examples
///
/// ```
/// use tablebook::api::ErrorEnvelope;
/// use tablebook::Error;
///
/// let envelope = ErrorEnvelope::from_error(&Error::InvalidRequest {
///     reasons: vec!["Guest count must be at least 1".into()],
/// });
/// assert_eq!(envelope.status, 400);
/// assert_eq!(envelope.error, "Bad Request");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    /// HTTP status; not part of the body.
    #[serde(skip)]
    pub status: u16,
    /// Short error label.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Individual problems, when there are several.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorEnvelope {
    /// Maps an error to its envelope. Internal errors get a generic message.
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        let kind = err.kind();
        let (message, details) = match err {
            Error::InvalidRequest { reasons } => {
                ("Validation failed".to_string(), Some(reasons.clone()))
            }
            Error::Validation { field, message } => {
                (message.clone(), Some(vec![format!("{field}: {message}")]))
            }
            Error::NotFound { resource } => (format!("{resource} not found"), None),
            Error::NoAvailability { reason } => (reason.clone(), None),
            Error::AfterClosing { end, closing } => (
                "Reservation end time must be before closing time".to_string(),
                Some(vec![format!(
                    "ends at {}, closes at {}",
                    end.to_rfc3339(),
                    closing.to_rfc3339()
                )]),
            ),
            Error::OutsideOpeningHours { .. } => {
                ("Restaurant is closed at the requested time".to_string(), None)
            }
            _ if kind == ErrorKind::Internal => ("An unexpected error occurred".to_string(), None),
            other => (other.to_string(), None),
        };
        Self {
            status: kind.status(),
            error: kind.label().to_string(),
            message,
            details,
        }
    }
}

impl From<&Error> for ErrorEnvelope {
    fn from(err: &Error) -> Self {
        Self::from_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_payload_with_inline_client() {
        let payload: ReservationPayload = serde_json::from_str(
            r#"{"start_time": "2030-03-04T19:00:00Z", "guests": 4,
                "client": {"name": "Ada", "phone": "+1 555 0100"}, "notes": "terrace"}"#,
        )
        .unwrap();
        let request = payload.into_request(3).unwrap();
        assert_eq!(request.restaurant_id, 3);
        assert_eq!(request.notes.as_deref(), Some("terrace"));
        assert!(matches!(request.client, ClientRef::Details(ref c) if c.email.is_none()));
    }

    #[test]
    fn test_payload_needs_exactly_one_client() {
        let neither: ReservationPayload =
            serde_json::from_str(r#"{"start_time": "x", "guests": 2}"#).unwrap();
        assert!(matches!(
            neither.into_request(1),
            Err(Error::InvalidRequest { .. })
        ));

        let both: ReservationPayload = serde_json::from_str(
            r#"{"start_time": "x", "guests": 2, "client_id": 1,
                "client": {"name": "Ada", "phone": "5550100"}}"#,
        )
        .unwrap();
        assert!(both.into_request(1).is_err());
    }

    #[test]
    fn test_queries_parse() {
        let query = AvailableTablesQuery {
            date: "2030-03-04".into(),
            time: "19:30".into(),
            guests: 2,
        };
        let (date, time) = query.slot().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2030, 3, 4).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());

        let bad = AvailabilityQuery {
            datetime: "March 4th".into(),
            guests: 2,
        };
        assert!(bad.instant().is_err());
    }

    #[test]
    fn test_table_summary_is_camel_case() {
        let table = Table {
            id: 7,
            restaurant_id: 1,
            capacity: 4,
            zone_id: Some(2),
        };
        let json = serde_json::to_value(Success::new(vec![TableSummary::from(&table)])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "data": [{"id": 7, "capacity": 4, "zoneId": 2}]})
        );
    }

    #[test]
    fn test_envelopes() {
        let lost = ErrorEnvelope::from_error(&Error::TableNoLongerAvailable { table_id: 3 });
        assert_eq!(lost.status, 409);
        assert!(lost.message.contains("table 3"));

        let internal = ErrorEnvelope::from_error(&Error::Database(
            rusqlite::Error::QueryReturnedNoRows,
        ));
        assert_eq!(internal.status, 500);
        assert_eq!(internal.message, "An unexpected error occurred");

        let closing = Utc.with_ymd_and_hms(2024, 12, 25, 14, 0, 0).unwrap();
        let late = ErrorEnvelope::from_error(&Error::AfterClosing {
            end: closing + chrono::Duration::hours(1),
            closing,
        });
        let json = serde_json::to_value(&late).unwrap();
        assert_eq!(json["error"], "Bad Request");
        assert!(json.get("status").is_none());
        assert_eq!(json["details"].as_array().map(Vec::len), Some(1));

        let missing = ErrorEnvelope::from(&Error::not_found("restaurant 9"));
        assert_eq!(missing.message, "restaurant 9 not found");
        assert!(serde_json::to_value(&missing).unwrap().get("details").is_none());
    }
}
