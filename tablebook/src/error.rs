//! Error types for the tablebook library.
//!
//! This module provides the error hierarchy shared by every component of the
//! reservation engine, using `thiserror` for ergonomic error handling.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for operations that may fail with a tablebook error.
///
/// # Examples
///
/// ```
/// use tablebook::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(4)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the tablebook library.
#[derive(Debug, Error)]
pub enum Error {
    /// A single field failed validation.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A request failed validation for one or more reasons.
    #[error("invalid request: {}", reasons.join(", "))]
    InvalidRequest {
        /// Every validation failure found in the request.
        reasons: Vec<String>,
    },

    /// The requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// No table can satisfy the request for the requested window.
    #[error("no availability: {reason}")]
    NoAvailability {
        /// Why nothing could be allocated.
        reason: String,
    },

    /// The reservation would end after the restaurant closes.
    #[error("reservation ending at {end} runs past closing time {closing}")]
    AfterClosing {
        /// End of the requested reservation.
        end: DateTime<Utc>,
        /// Closing time of the last interval opened by the reservation start.
        closing: DateTime<Utc>,
    },

    /// The requested start precedes the day's first opening, or the day is closed.
    #[error("restaurant is closed at {start}")]
    OutsideOpeningHours {
        /// Requested start of the reservation.
        start: DateTime<Utc>,
    },

    /// The storage exclusion constraint rejected the insert after a race.
    #[error("table {table_id} is no longer available for the requested time")]
    TableNoLongerAvailable {
        /// The table that was lost to a concurrent booking.
        table_id: i64,
    },

    /// A client with the same unique field already exists.
    #[error("client with {field} '{value}' already exists")]
    DuplicateClient {
        /// The unique field that collided (`phone` or `email`).
        field: String,
        /// The colliding value.
        value: String,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A configuration or catalog document could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: i32,
        /// The schema version found in the database.
        found: i32,
    },
}

/// Coarse classification of errors, as exposed to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input, including closing-time violations.
    Validation,
    /// Unknown restaurant, client or table.
    NotFound,
    /// No table fits the requested window; pick another time.
    NoAvailability,
    /// A table existed but was lost to a concurrent booking; retry.
    Conflict,
    /// Uniqueness violation while creating a client.
    DuplicateClient,
    /// Unexpected storage or infrastructure failure.
    Internal,
}

impl ErrorKind {
    /// HTTP status code used in the error envelope.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::Validation | Self::NoAvailability => 400,
            Self::NotFound => 404,
            Self::Conflict | Self::DuplicateClient => 409,
            Self::Internal => 500,
        }
    }

    /// Short label used as the `error` field of the envelope.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Validation => "Bad Request",
            Self::NotFound => "Not Found",
            Self::NoAvailability => "No Availability",
            Self::Conflict => "Conflict",
            Self::DuplicateClient => "Duplicate Client",
            Self::Internal => "Internal Server Error",
        }
    }
}

impl Error {
    /// Classify this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tablebook::{Error, ErrorKind};
    ///
    /// let err = Error::TableNoLongerAvailable { table_id: 3 };
    /// assert_eq!(err.kind(), ErrorKind::Conflict);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::InvalidRequest { .. }
            | Self::AfterClosing { .. }
            | Self::OutsideOpeningHours { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NoAvailability { .. } => ErrorKind::NoAvailability,
            Self::TableNoLongerAvailable { .. } => ErrorKind::Conflict,
            Self::DuplicateClient { .. } => ErrorKind::DuplicateClient,
            Self::Database(_)
            | Self::Configuration(_)
            | Self::Io(_)
            | Self::UnsupportedSchemaVersion { .. } => ErrorKind::Internal,
        }
    }

    /// Shorthand for a [`Error::NotFound`] naming the resource.
    pub(crate) fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if error is the race-lost outcome of a booking insert.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::TableNoLongerAvailable { .. })
    }

    /// Check if the database stayed locked past the busy timeout.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Database(rusqlite::Error::SqliteFailure(failure, _))
                if matches!(
                    failure.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}
