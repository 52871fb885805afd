//! CLI-specific error types with exit codes.
//!
//! Library errors are wrapped and printed as the JSON error envelope; the
//! remaining variants cover failures that only exist at the command line.

use std::fmt;

use serde::Serialize;
use tablebook::allocator::TableGaps;
use tablebook::api::ErrorEnvelope;
use tablebook::{Error as LibError, ErrorKind};

/// CLI-specific error type with exit code mapping.
#[derive(Debug)]
pub enum CliError {
    /// Library error (wrapped).
    Library(LibError),

    /// A booking found no table; carries the free windows of the day.
    Unavailable {
        /// The `NoAvailability` error.
        error: LibError,
        /// Free windows on every table seating the party.
        alternatives: Vec<TableGaps>,
    },

    /// Missing or unknown API key.
    Unauthorized,

    /// Invalid command-line arguments.
    InvalidArguments(String),

    /// I/O error.
    Io(std::io::Error),

    /// Timeout waiting for database lock.
    Timeout,

    /// No database in the data directory.
    NoDataDirectory,

    /// Configuration error.
    Config(String),
}

/// Error body printed on stderr when a booking finds no table.
#[derive(Serialize)]
struct UnavailableBody<'a> {
    #[serde(flatten)]
    envelope: ErrorEnvelope,
    alternatives: &'a [TableGaps],
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Request rejected (validation, closing time, no availability)
    /// - 2: Timeout waiting for database lock
    /// - 3: No database found in the data directory
    /// - 4: Invalid arguments or missing/unknown API key
    /// - 5: I/O error
    /// - 6: Other library error
    /// - 7: Configuration error
    /// - 8: Restaurant, client or table not found
    /// - 9: Conflict (table lost to a concurrent booking, duplicate client)
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Unavailable { .. } => 1,
            CliError::Library(lib_err) => match lib_err.kind() {
                ErrorKind::Validation | ErrorKind::NoAvailability => 1,
                ErrorKind::NotFound => 8,
                ErrorKind::Conflict | ErrorKind::DuplicateClient => 9,
                ErrorKind::Internal => 6,
            },
            CliError::Timeout => 2,
            CliError::NoDataDirectory => 3,
            CliError::Unauthorized | CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
            CliError::Config(_) => 7,
        }
    }

    /// The error envelope describing this error.
    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            CliError::Library(e) | CliError::Unavailable { error: e, .. } => {
                ErrorEnvelope::from_error(e)
            }
            CliError::Unauthorized => cli_envelope(401, "Unauthorized", self.to_string()),
            CliError::InvalidArguments(_) => cli_envelope(400, "Bad Request", self.to_string()),
            CliError::Timeout => cli_envelope(503, "Service Unavailable", self.to_string()),
            CliError::NoDataDirectory => cli_envelope(404, "Not Found", self.to_string()),
            CliError::Io(_) | CliError::Config(_) => {
                cli_envelope(500, "Internal Server Error", self.to_string())
            }
        }
    }

    /// The JSON printed on stderr.
    pub fn to_json(&self) -> String {
        let rendered = match self {
            CliError::Unavailable { alternatives, .. } => {
                serde_json::to_string_pretty(&UnavailableBody {
                    envelope: self.envelope(),
                    alternatives,
                })
            }
            _ => serde_json::to_string_pretty(&self.envelope()),
        };
        rendered.unwrap_or_else(|_| format!("{{\"error\":\"{self}\"}}"))
    }
}

fn cli_envelope(status: u16, error: &str, message: String) -> ErrorEnvelope {
    ErrorEnvelope {
        status,
        error: error.to_string(),
        message,
        details: None,
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Library(e) | CliError::Unavailable { error: e, .. } => write!(f, "{e}"),
            CliError::Unauthorized => write!(f, "Invalid or missing API key"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Timeout => write!(f, "Timeout waiting for database lock"),
            CliError::NoDataDirectory => {
                write!(f, "Database not found (run `tablebook init` first)")
            }
            CliError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Library(e) | CliError::Unavailable { error: e, .. } => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        if e.is_busy() {
            CliError::Timeout
        } else {
            CliError::Library(e)
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(e.into())
    }
}
