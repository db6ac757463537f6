//! Ingestion report model and display helpers.
//!
//! Reports are produced by the ingest agent and stored verbatim; the
//! backend only reads them for display and export.

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/* --------------------------------------------------------------------------
Report model
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub report_summary: ReportSummary,
    #[serde(default)]
    pub sources: Vec<ReportSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<ReportDestinations>,
    #[serde(default)]
    pub phases: ReportPhases,
    #[serde(default)]
    pub file_details: Vec<ReportFileDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_summary: Option<OverallSummary>,
    /// Free-form runtime details (versions, OS, locale).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<ReportSecurity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<ReportUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest_utility_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<ReportEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photographer: Option<ReportPhotographer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportUser {
    pub user_id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEvent {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPhotographer {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSource {
    pub id: String,
    pub path: String,
    pub selected_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDestinations {
    pub working_base: Option<String>,
    pub effective_working: Option<String>,
    pub backup_base: Option<String>,
    pub effective_backup: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPhases {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<ReportPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy: Option<ReportPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ReportPhase>,
}

/// One phase of an ingest run. Phase-specific counters (files copied,
/// hash values, ...) are kept in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPhase {
    #[serde(default)]
    pub started: Option<String>,
    #[serde(default)]
    pub ended: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFileDetail {
    pub name: String,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copied_to_working: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_event: Option<bool>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub total_files_attempted: i64,
    pub total_files_ingested: i64,
    pub total_bytes_ingested: i64,
    #[serde(default)]
    pub excluded_files: Vec<ExcludedFile>,
    pub overall_status: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSecurity {
    pub encrypted: Option<bool>,
    pub algorithm: Option<String>,
    pub checksum: Option<String>,
    pub signed_by: Option<String>,
}

/// Path under which a job's report is served.
pub fn report_url(job_id: &str) -> String {
    format!("/reports/ingest/{job_id}.json")
}

/* --------------------------------------------------------------------------
Display helpers
-------------------------------------------------------------------------- */

const BYTE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human-readable byte count in base 1024 with up to two decimals.
///
/// Absent or negative sizes render as `N/A`.
pub fn format_bytes(bytes: Option<i64>) -> String {
    let Some(bytes) = bytes.filter(|b| *b >= 0) else {
        return "N/A".to_string();
    };
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let bytes = bytes as f64;
    let exponent = (bytes.ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(BYTE_UNITS.len() - 1);
    let scaled = bytes / 1024f64.powi(exponent as i32);

    let rendered = format!("{scaled:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", BYTE_UNITS[exponent])
}

/// Visual tone of a status value in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Positive,
    Negative,
    InProgress,
    Neutral,
}

const POSITIVE_STATUSES: &[&str] = &["success", "verified", "passed", "true", "yes", "ingested", "completed"];
const NEGATIVE_STATUSES: &[&str] = &["failed", "error", "no", "excluded", "false"];
const IN_PROGRESS_STATUSES: &[&str] = &["processing", "pending", "copying", "checksumming"];

pub fn status_tone(status: &str) -> StatusTone {
    let status = status.trim().to_lowercase();
    if POSITIVE_STATUSES.contains(&status.as_str()) {
        StatusTone::Positive
    } else if NEGATIVE_STATUSES.contains(&status.as_str()) {
        StatusTone::Negative
    } else if IN_PROGRESS_STATUSES.contains(&status.as_str()) {
        StatusTone::InProgress
    } else {
        StatusTone::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_bytes_in_base_1024() {
        assert_eq!(format_bytes(Some(0)), "0 Bytes");
        assert_eq!(format_bytes(Some(512)), "512 Bytes");
        assert_eq!(format_bytes(Some(1024)), "1 KB");
        assert_eq!(format_bytes(Some(1536)), "1.5 KB");
        assert_eq!(format_bytes(Some(2 * 1024 * 1024 * 1024)), "2 GB");
    }

    #[test]
    fn absent_or_negative_bytes_are_not_available() {
        assert_eq!(format_bytes(None), "N/A");
        assert_eq!(format_bytes(Some(-1)), "N/A");
    }

    #[test]
    fn classifies_status_tone() {
        assert_eq!(status_tone("Verified"), StatusTone::Positive);
        assert_eq!(status_tone("excluded"), StatusTone::Negative);
        assert_eq!(status_tone("CHECKSUMMING"), StatusTone::InProgress);
        assert_eq!(status_tone("queued"), StatusTone::Neutral);
    }

    #[test]
    fn parses_agent_report() {
        let report: IngestionReport = serde_json::from_value(serde_json::json!({
            "reportSummary": {
                "id": "rep1",
                "timestamp": "2024-07-15T15:30:00Z",
                "event": { "id": "evt1", "name": "Keynote" },
                "photographer": { "id": "p1", "name": "Alice" }
            },
            "phases": {
                "copy": { "started": "a", "ended": "b", "status": "completed", "filesCopied": 145 }
            },
            "fileDetails": [
                { "name": "IMG_0001.CR3", "size": 24_117_248, "status": "ingested" }
            ],
            "overallSummary": {
                "totalFilesAttempted": 150,
                "totalFilesIngested": 145,
                "totalBytesIngested": 3_500_000_000i64,
                "excludedFiles": [{ "name": "x.tmp", "reason": "temp file" }],
                "overallStatus": "completed",
                "notes": []
            }
        }))
        .unwrap();

        let copy = report.phases.copy.as_ref().unwrap();
        assert_eq!(copy.details["filesCopied"], 145);
        assert_eq!(report.file_details[0].status, "ingested");
        assert_eq!(report.overall_summary.unwrap().excluded_files.len(), 1);
    }

    #[test]
    fn report_url_uses_job_id() {
        assert_eq!(report_url("job1"), "/reports/ingest/job1.json");
    }
}
