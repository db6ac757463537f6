/// Identifiers are opaque strings assigned by the backend or the agent
/// (e.g. `evt_summit_d1`, `user001`).
pub type EntityId = String;

/// All audit timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
