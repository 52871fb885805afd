//! Client directory: validation and find-or-create keyed on phone number.

use chrono::{DateTime, Utc};

use crate::database::Database;
use crate::error::{Error, Result};
use crate::model::{Client, ClientId, NewClient};

/// Shortest accepted client name, in characters after trimming.
pub const MIN_NAME_LENGTH: usize = 2;
/// Longest accepted client name, in characters after trimming.
pub const MAX_NAME_LENGTH: usize = 100;
/// Longest accepted e-mail address.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Strips spaces, dashes and parentheses from a phone number.
///
/// # Examples
///
/// ```
/// use tablebook::clients::normalize_phone;
///
/// assert_eq!(normalize_phone("+1 (555) 010-0100"), "+15550100100");
/// ```
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !(c.is_whitespace() || matches!(c, '-' | '(' | ')')))
        .collect()
}

/// An optional `+`, a non-zero digit, then up to 15 more digits.
fn is_valid_phone(normalized: &str) -> bool {
    let digits = normalized.strip_prefix('+').unwrap_or(normalized);
    let mut chars = digits.chars();
    match chars.next() {
        Some('1'..='9') => {}
        _ => return false,
    }
    let rest = chars.as_str();
    rest.len() <= 15 && rest.chars().all(|c| c.is_ascii_digit())
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.contains('@') && !part.contains(char::is_whitespace);
    if !clean(local) || !clean(domain) {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validates raw client data and returns it normalized: name and e-mail
/// trimmed, phone stripped of formatting, empty e-mail treated as absent.
///
/// # Errors
///
/// Returns every validation failure as [`Error::InvalidRequest`].
///
/// # Examples
///
/// ```
/// use tablebook::clients::validate_client;
/// use tablebook::model::NewClient;
///
/// let client = validate_client(&NewClient {
///     name: "  Ada Lovelace ".into(),
///     phone: "+44 20 7946 0000".into(),
///     email: None,
/// })
/// .unwrap();
/// assert_eq!(client.name, "Ada Lovelace");
/// assert_eq!(client.phone, "+442079460000");
/// ```
pub fn validate_client(client: &NewClient) -> Result<NewClient> {
    let mut reasons = Vec::new();

    let name = client.name.trim();
    let name_length = name.chars().count();
    if name.is_empty() {
        reasons.push("Name is required".to_string());
    } else if name_length < MIN_NAME_LENGTH {
        reasons.push(format!(
            "Name must be at least {MIN_NAME_LENGTH} characters long"
        ));
    } else if name_length > MAX_NAME_LENGTH {
        reasons.push(format!("Name cannot exceed {MAX_NAME_LENGTH} characters"));
    }

    let phone = normalize_phone(&client.phone);
    if phone.is_empty() {
        reasons.push("Phone is required".to_string());
    } else if !is_valid_phone(&phone) {
        reasons.push("Invalid phone format".to_string());
    }

    let email = client
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty());
    if let Some(email) = email {
        if !is_valid_email(email) {
            reasons.push("Invalid email format".to_string());
        }
        if email.len() > MAX_EMAIL_LENGTH {
            reasons.push(format!("Email cannot exceed {MAX_EMAIL_LENGTH} characters"));
        }
    }

    if !reasons.is_empty() {
        return Err(Error::InvalidRequest { reasons });
    }

    Ok(NewClient {
        name: name.to_string(),
        phone,
        email: email.map(str::to_string),
    })
}

/// Client lookups and find-or-create over the storage collaborator.
#[derive(Debug)]
pub struct ClientDirectory<'a> {
    db: &'a mut Database,
}

impl<'a> ClientDirectory<'a> {
    /// Create a directory over `db`.
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Look up a client by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub fn get(&self, id: ClientId) -> Result<Client> {
        Database::client(self.db.connection(), id)?
            .ok_or_else(|| Error::not_found(format!("client {id}")))
    }

    /// Look up a client by phone number, normalizing it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn find_by_phone(&self, phone: &str) -> Result<Option<Client>> {
        Database::client_by_phone(self.db.connection(), &normalize_phone(phone))
    }

    /// Look up a client by e-mail address.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn find_by_email(&self, email: &str) -> Result<Option<Client>> {
        Database::client_by_email(self.db.connection(), email.trim())
    }

    /// Return the client with this phone number, creating it if needed.
    ///
    /// Idempotent: repeated calls with the same phone return the same id.
    /// A concurrent creator winning the insert race is absorbed by reading
    /// the winner's row back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for invalid data, or
    /// [`Error::DuplicateClient`] if the e-mail belongs to another client.
    pub fn find_or_create(&mut self, client: &NewClient, now: DateTime<Utc>) -> Result<Client> {
        let client = validate_client(client)?;

        if let Some(existing) = Database::client_by_phone(self.db.connection(), &client.phone)? {
            log::debug!("found client {} by phone", existing.id);
            return Ok(existing);
        }

        match self.db.insert_client(&client, now) {
            Ok(created) => {
                log::info!("created client {}", created.id);
                Ok(created)
            }
            // A concurrent creator may have won on either unique column.
            Err(Error::DuplicateClient { field, value }) => {
                Database::client_by_phone(self.db.connection(), &client.phone)?
                    .ok_or(Error::DuplicateClient { field, value })
            }
            Err(e) => Err(e),
        }
    }
}
