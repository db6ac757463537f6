//! Production pipeline stages.
//!
//! Every event and shot request sits at one [`ProcessPoint`]. The stages
//! form a fixed total order; any stage may be set directly from any other,
//! so backward moves are allowed but can be detected with
//! [`ProcessPoint::is_regression`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A stage in the production pipeline, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum ProcessPoint {
    #[default]
    Idle,
    Ingest,
    Cull,
    Color,
    Delivered,
}

impl ProcessPoint {
    /// All stages in pipeline order.
    pub const ALL: [ProcessPoint; 5] = [
        ProcessPoint::Idle,
        ProcessPoint::Ingest,
        ProcessPoint::Cull,
        ProcessPoint::Color,
        ProcessPoint::Delivered,
    ];

    /// Case-insensitive lookup. Unknown or absent input maps to `Idle`.
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_default()
    }

    /// Strict case-insensitive lookup.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Ingest => "Ingest",
            Self::Cull => "Cull",
            Self::Color => "Color",
            Self::Delivered => "Delivered",
        }
    }

    /// Zero-based position in the pipeline.
    pub fn position(self) -> usize {
        self as usize
    }

    /// Display colour token. Charts group by this value.
    pub fn color_token(self) -> &'static str {
        match self {
            Self::Idle => "process-idle",
            Self::Ingest => "process-ingest",
            Self::Cull => "process-cull",
            Self::Color => "process-color",
            Self::Delivered => "process-delivered",
        }
    }

    pub fn is_complete(self) -> bool {
        self == Self::Delivered
    }

    /// True when moving from `self` to `next` goes backwards.
    pub fn is_regression(self, next: ProcessPoint) -> bool {
        next < self
    }
}

/// Colour token for a raw, possibly unknown stage string.
pub fn color_for_raw(raw: Option<&str>) -> &'static str {
    match raw.and_then(ProcessPoint::parse) {
        Some(stage) => stage.color_token(),
        None => "process-default",
    }
}

impl fmt::Display for ProcessPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Inbound values are normalised rather than rejected so stored data never
// holds a stage outside the fixed set.
impl<'de> Deserialize<'de> for ProcessPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(Self::normalize(raw.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_case_insensitive() {
        assert_eq!(ProcessPoint::normalize(Some("INGEST")), ProcessPoint::Ingest);
        assert_eq!(ProcessPoint::normalize(Some("ingest")), ProcessPoint::Ingest);
        assert_eq!(ProcessPoint::normalize(Some(" Delivered ")), ProcessPoint::Delivered);
    }

    #[test]
    fn normalize_defaults_to_idle() {
        assert_eq!(ProcessPoint::normalize(None), ProcessPoint::Idle);
        assert_eq!(ProcessPoint::normalize(Some("archived")), ProcessPoint::Idle);
        assert_eq!(ProcessPoint::normalize(Some("")), ProcessPoint::Idle);
    }

    #[test]
    fn stages_are_totally_ordered() {
        for pair in ProcessPoint::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].position() + 1, pair[1].position());
        }
    }

    #[test]
    fn only_delivered_is_complete() {
        let complete: Vec<_> = ProcessPoint::ALL.into_iter().filter(|s| s.is_complete()).collect();
        assert_eq!(complete, vec![ProcessPoint::Delivered]);
    }

    #[test]
    fn regression_detection() {
        assert!(ProcessPoint::Delivered.is_regression(ProcessPoint::Idle));
        assert!(!ProcessPoint::Cull.is_regression(ProcessPoint::Color));
        assert!(!ProcessPoint::Cull.is_regression(ProcessPoint::Cull));
    }

    #[test]
    fn unknown_raw_stage_gets_default_colour() {
        assert_eq!(color_for_raw(Some("cull")), "process-cull");
        assert_eq!(color_for_raw(Some("Archive")), "process-default");
        assert_eq!(color_for_raw(None), "process-default");
    }

    #[test]
    fn deserializes_loosely() {
        let stage: ProcessPoint = serde_json::from_str("\"COLOR\"").unwrap();
        assert_eq!(stage, ProcessPoint::Color);
        let stage: ProcessPoint = serde_json::from_str("null").unwrap();
        assert_eq!(stage, ProcessPoint::Idle);
        assert_eq!(serde_json::to_string(&ProcessPoint::Cull).unwrap(), "\"Cull\"");
    }
}
