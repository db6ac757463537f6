//! Time-derived event status.
//!
//! An event with both a start and an end time is classified by how far
//! `now` is from those instants. Events without a complete time window
//! keep their static status label.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Events starting within this many minutes are "Starting Soon".
pub const STARTING_SOON_WINDOW_MINUTES: f64 = 15.0;

/// Events starting within this many minutes (but outside the
/// starting-soon window) are "Upcoming".
pub const UPCOMING_WINDOW_MINUTES: f64 = 60.0;

/// How often hosts should re-derive statuses.
pub const STATUS_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Static label used when an event has no status of its own.
pub const DEFAULT_STATIC_STATUS: &str = "Scheduled";

/// Human-facing lifecycle label of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventStatus {
    Scheduled,
    Upcoming,
    StartingSoon,
    Ongoing,
    Done,
    /// A static label carried by an event without a time window.
    Other(String),
}

impl EventStatus {
    /// Map a label to a status. Unknown labels are preserved as [`EventStatus::Other`].
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "" | "Scheduled" => Self::Scheduled,
            "Upcoming" => Self::Upcoming,
            "Starting Soon" => Self::StartingSoon,
            "Ongoing" => Self::Ongoing,
            "Done" => Self::Done,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Upcoming => "Upcoming",
            Self::StartingSoon => "Starting Soon",
            Self::Ongoing => "Ongoing",
            Self::Done => "Done",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for EventStatus {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<EventStatus> for String {
    fn from(value: EventStatus) -> Self {
        value.label().to_string()
    }
}

/// Classify minute offsets into a status. First matching rule wins.
pub fn classify(minutes_until_start: f64, minutes_until_end: f64) -> EventStatus {
    if minutes_until_end <= 0.0 {
        EventStatus::Done
    } else if minutes_until_start <= 0.0 {
        EventStatus::Ongoing
    } else if minutes_until_start <= STARTING_SOON_WINDOW_MINUTES {
        EventStatus::StartingSoon
    } else if minutes_until_start <= UPCOMING_WINDOW_MINUTES {
        EventStatus::Upcoming
    } else {
        EventStatus::Scheduled
    }
}

/// Derive an event's status at `now`.
///
/// The event's day and wall-clock times are interpreted in `now`'s time
/// zone, built from the date parts so the day never shifts across a UTC
/// boundary. When either time is absent the `fallback` label is returned.
pub fn derive_status<Tz: TimeZone>(
    now: &DateTime<Tz>,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    fallback: &str,
) -> EventStatus {
    let (Some(start_time), Some(end_time)) = (start_time, end_time) else {
        return EventStatus::from_label(fallback);
    };

    let tz = now.timezone();
    let (Some(start), Some(end)) = (
        combine(&tz, date.and_time(start_time)),
        combine(&tz, date.and_time(end_time)),
    ) else {
        return EventStatus::from_label(fallback);
    };

    classify(minutes_until(now, &start), minutes_until(now, &end))
}

/// Whether the window has already ended at `now`. Events without a
/// complete window never count as ended.
pub fn has_ended<Tz: TimeZone>(
    now: &DateTime<Tz>,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
) -> bool {
    if start_time.is_none() {
        return false;
    }
    let Some(end_time) = end_time else {
        return false;
    };
    combine(&now.timezone(), date.and_time(end_time))
        .is_some_and(|end| minutes_until(now, &end) <= 0.0)
}

/// Resolve a local wall-clock instant in `tz`.
///
/// Ambiguous instants (DST fall-back) take the earlier mapping; instants
/// inside a DST gap are pushed forward by an hour.
pub fn combine<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(local + chrono::Duration::hours(1)))
                .earliest()
        })
}

fn minutes_until<Tz: TimeZone>(now: &DateTime<Tz>, then: &DateTime<Tz>) -> f64 {
    then.clone()
        .signed_duration_since(now.clone())
        .num_milliseconds() as f64
        / 60_000.0
}
