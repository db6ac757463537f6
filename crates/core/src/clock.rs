//! Time sources and wall-clock parsing helpers.
//!
//! Status derivation never reads the system clock itself; callers obtain
//! `now` from a [`Clock`] and pass it in. Tests use [`ManualClock`] to
//! drive time deterministically.

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// A source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Reads the operating system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.lock().unwrap_or_else(|p| p.into_inner()) = to;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Parse a local wall-clock time in `HH:MM` or `HH:MM:SS` form.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, CoreError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| CoreError::Validation(format!("Invalid clock time '{raw}'. Expected HH:MM")))
}

/// Parse a calendar day in `YYYY-MM-DD` form.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("Invalid date '{raw}'. Expected YYYY-MM-DD")))
}

/// Serde adapter for optional `HH:MM` clock times.
///
/// Empty strings deserialize to `None` since the dashboard sends `""` for
/// an unset time field.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_clock_time(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Serde adapter for clock times in partial updates.
///
/// Use with `#[serde(default)]`: an absent field stays `None` (keep the
/// current time), while `null` or `""` become `Some(None)` (clear it).
pub mod hhmm_patch {
    use chrono::NaiveTime;
    use serde::Deserializer;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<NaiveTime>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::hhmm::deserialize(deserializer).map(Some)
    }
}
