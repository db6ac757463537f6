pub mod events;
pub mod ingestion;
pub mod notifications;
pub mod projects;
pub mod shot_requests;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// `?now=` override shared by the time-dependent read endpoints.
///
/// The offset of `now` is taken as the viewer's time zone. When absent,
/// handlers fall back to the server's local time.
#[derive(Debug, Default, Deserialize)]
pub struct NowQuery {
    pub now: Option<DateTime<FixedOffset>>,
}
