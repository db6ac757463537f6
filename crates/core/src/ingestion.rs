//! Ingestion jobs reported by the local ingest agent.
//!
//! The agent owns every field except `hive_processed_completion`, which
//! only the reconciler may set. Reports from the agent are merged into the
//! ledger with [`IngestionJobReport::merge_into`], which never touches it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionJobStatus {
    #[serde(alias = "pending")]
    Queued,
    #[serde(
        alias = "processing",
        alias = "processing_files",
        alias = "copying",
        alias = "checksumming"
    )]
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl IngestionJobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionJob {
    pub job_id: EntityId,
    pub status: IngestionJobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_processed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_matched_to_events: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_unmatched: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_files: Option<i64>,
    #[serde(default, rename = "totalSizeMB", skip_serializing_if = "Option::is_none")]
    pub total_size_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_result: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub determined_event_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub determined_photographer_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    /// Set once this job's shot updates have been applied.
    #[serde(default)]
    pub hive_processed_completion: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl IngestionJob {
    /// Number of files the job attributes to events.
    pub fn matched_file_count(&self) -> i64 {
        self.files_matched_to_events
            .or(self.files_processed)
            .unwrap_or(0)
    }

    /// Resolved event and photographer, when both are present and non-blank.
    pub fn resolved_target(&self) -> Option<(&str, &str)> {
        let event = self
            .determined_event_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())?;
        let photographer = self
            .determined_photographer_id
            .as_deref()
            .filter(|s| !s.trim().is_empty())?;
        Some((event, photographer))
    }

    /// Completed and not yet reconciled.
    pub fn awaits_reconciliation(&self) -> bool {
        self.status == IngestionJobStatus::Completed && !self.hive_processed_completion
    }
}

/// A status report from the agent. Every field but `job_id` is optional so
/// partial progress updates can be merged.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionJobReport {
    pub job_id: EntityId,
    pub status: Option<IngestionJobStatus>,
    pub progress: Option<f64>,
    pub message: Option<String>,
    pub files_processed: Option<i64>,
    pub files_matched_to_events: Option<i64>,
    pub files_unmatched: Option<i64>,
    pub total_files: Option<i64>,
    #[serde(rename = "totalSizeMB")]
    pub total_size_mb: Option<f64>,
    pub checksum_result: Option<String>,
    pub errors: Option<Vec<String>>,
    pub determined_event_id: Option<EntityId>,
    pub determined_photographer_id: Option<EntityId>,
    pub report_url: Option<String>,
}

impl IngestionJobReport {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.job_id.trim().is_empty() {
            return Err(CoreError::Validation("jobId must not be empty".to_string()));
        }
        Ok(())
    }

    /// Start a ledger entry from the first report seen for a job.
    pub fn into_job(self, at: Timestamp) -> Result<IngestionJob, CoreError> {
        self.validate()?;
        let mut job = IngestionJob {
            job_id: self.job_id.clone(),
            status: IngestionJobStatus::Queued,
            progress: None,
            message: None,
            files_processed: None,
            files_matched_to_events: None,
            files_unmatched: None,
            total_files: None,
            total_size_mb: None,
            checksum_result: None,
            errors: Vec::new(),
            determined_event_id: None,
            determined_photographer_id: None,
            report_url: None,
            hive_processed_completion: false,
            updated_at: None,
        };
        self.merge_into(&mut job, at);
        Ok(job)
    }

    /// Overwrite the fields this report carries.
    pub fn merge_into(self, job: &mut IngestionJob, at: Timestamp) {
        fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        if let Some(status) = self.status {
            job.status = status;
        }
        overwrite(&mut job.progress, self.progress);
        overwrite(&mut job.message, self.message);
        overwrite(&mut job.files_processed, self.files_processed);
        overwrite(&mut job.files_matched_to_events, self.files_matched_to_events);
        overwrite(&mut job.files_unmatched, self.files_unmatched);
        overwrite(&mut job.total_files, self.total_files);
        overwrite(&mut job.total_size_mb, self.total_size_mb);
        overwrite(&mut job.checksum_result, self.checksum_result);
        overwrite(&mut job.determined_event_id, self.determined_event_id);
        overwrite(&mut job.determined_photographer_id, self.determined_photographer_id);
        overwrite(&mut job.report_url, self.report_url);
        if let Some(errors) = self.errors {
            job.errors = errors;
        }
        job.updated_at = Some(at);
    }
}
