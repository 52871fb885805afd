//! Configuration schema definitions.
//!
//! Every field is optional so that partial documents from different sources
//! can be merged; [`BookingPolicy`] is the fully resolved form used by the
//! engine.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default display granularity of generated slots, in minutes.
pub const DEFAULT_SLOT_GRANULARITY_MINUTES: u32 = 15;

/// Default upper bound on party size.
pub const DEFAULT_MAX_GUESTS: u32 = 20;

/// Default time to wait for the database write lock, in seconds.
pub const DEFAULT_LOCK_WAIT_SECONDS: u64 = 5;

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use tablebook::config::Config;
///
/// let config: Config = serde_yaml::from_str("slot_granularity_minutes: 30\n").unwrap();
/// assert_eq!(config.slot_granularity_minutes, Some(30));
/// assert_eq!(config.max_guests, None);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Step between displayed slots when `slot_step` is `granularity`.
    pub slot_granularity_minutes: Option<u32>,

    /// Which step the slot generator uses.
    pub slot_step: Option<SlotStepMode>,

    /// Largest party accepted by the booking transaction.
    pub max_guests: Option<u32>,

    /// Maximum time to wait for database lock acquisition (seconds).
    pub maximum_lock_wait_seconds: Option<u64>,
}

/// How candidate slot starts are spaced.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlotStepMode {
    /// Fixed display granularity (`slot_granularity_minutes`).
    #[default]
    Granularity,
    /// The restaurant's reservation duration.
    ReservationDuration,
}

impl std::str::FromStr for SlotStepMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "granularity" => Ok(Self::Granularity),
            "reservation_duration" | "duration" => Ok(Self::ReservationDuration),
            _ => Err(format!("invalid slot step: {s}")),
        }
    }
}

/// Fully resolved booking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Step between displayed slots in granularity mode.
    pub slot_granularity: Duration,
    /// Which step the slot generator uses.
    pub slot_step: SlotStepMode,
    /// Largest party accepted.
    pub max_guests: u32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            slot_granularity: Duration::minutes(i64::from(DEFAULT_SLOT_GRANULARITY_MINUTES)),
            slot_step: SlotStepMode::Granularity,
            max_guests: DEFAULT_MAX_GUESTS,
        }
    }
}

impl BookingPolicy {
    /// The slot step for a restaurant with the given reservation duration.
    #[must_use]
    pub fn step_for(&self, reservation_duration: Duration) -> Duration {
        match self.slot_step {
            SlotStepMode::Granularity => self.slot_granularity,
            SlotStepMode::ReservationDuration => reservation_duration,
        }
    }
}

impl Config {
    /// Resolve the booking policy, filling unset fields with defaults.
    #[must_use]
    pub fn booking_policy(&self) -> BookingPolicy {
        let defaults = BookingPolicy::default();
        BookingPolicy {
            slot_granularity: self
                .slot_granularity_minutes
                .map_or(defaults.slot_granularity, |m| Duration::minutes(i64::from(m))),
            slot_step: self.slot_step.unwrap_or(defaults.slot_step),
            max_guests: self.max_guests.unwrap_or(defaults.max_guests),
        }
    }

    /// Lock wait in seconds, falling back to the default.
    #[must_use]
    pub fn lock_wait_seconds(&self) -> u64 {
        self.maximum_lock_wait_seconds
            .unwrap_or(DEFAULT_LOCK_WAIT_SECONDS)
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: &Config) {
        if other.slot_granularity_minutes.is_some() {
            self.slot_granularity_minutes = other.slot_granularity_minutes;
        }
        if other.slot_step.is_some() {
            self.slot_step = other.slot_step;
        }
        if other.max_guests.is_some() {
            self.max_guests = other.max_guests;
        }
        if other.maximum_lock_wait_seconds.is_some() {
            self.maximum_lock_wait_seconds = other.maximum_lock_wait_seconds;
        }
    }
}
