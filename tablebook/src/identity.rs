//! Resolves caller credentials to the restaurant they act for.
//!
//! Everything downstream trusts the returned id unconditionally.

use rusqlite::Connection;

use crate::database::Database;
use crate::error::Result;
use crate::model::RestaurantId;

/// Look up the restaurant owning `api_key`.
///
/// Surrounding whitespace and an optional `Bearer ` prefix are ignored, so a
/// raw `Authorization` header value can be passed through. Returns `None`
/// for an empty or unknown key.
///
/// # Errors
///
/// Returns an error if the lookup fails.
pub fn authenticate(conn: &Connection, api_key: &str) -> Result<Option<RestaurantId>> {
    let key = api_key.trim();
    let key = key.strip_prefix("Bearer ").map_or(key, str::trim);
    if key.is_empty() {
        return Ok(None);
    }

    let restaurant = Database::restaurant_by_api_key(conn, key)?;
    match restaurant {
        Some(id) => log::debug!("api key resolved to restaurant {id}"),
        None => log::warn!("rejected unknown api key"),
    }
    Ok(restaurant)
}
