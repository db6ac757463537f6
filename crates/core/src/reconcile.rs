//! Applies completed ingestion jobs to shot request state.
//!
//! A job drives shot mutations at most once: after its shots are marked
//! `Captured` its `hive_processed_completion` flag is set, and flagged jobs
//! are never considered again, even when they matched no shots. Only jobs
//! whose event or photographer is not yet known stay unflagged so a later
//! pass can pick them up.

use serde::Serialize;

use crate::ingestion::IngestionJob;
use crate::store::ProductionStore;
use crate::types::{EntityId, Timestamp};

/// What one reconciliation pass did with one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum JobOutcome {
    /// Shots were marked captured (possibly none, if no candidates were left).
    Applied { shots: Vec<EntityId> },
    /// The job reported no matched files. Marked processed.
    NothingToApply,
    /// Event or photographer missing. Left unprocessed.
    Unresolved,
    /// The resolved event is not in the store, so it has no shots to
    /// capture. Marked processed.
    UnknownEvent { event_id: EntityId },
    /// The store refused the capture. Left unprocessed.
    Failed { reason: String },
    /// Not completed, or already processed.
    Skipped,
}

impl JobOutcome {
    pub fn marks_processed(&self) -> bool {
        matches!(
            self,
            Self::Applied { .. } | Self::NothingToApply | Self::UnknownEvent { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReconciliation {
    pub job_id: EntityId,
    #[serde(flatten)]
    pub outcome: JobOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub jobs: Vec<IngestionJob>,
    pub shot_updates_applied: usize,
    pub per_job: Vec<JobReconciliation>,
}

impl ReconcileOutcome {
    /// Jobs newly flagged as processed by this pass.
    pub fn newly_processed(&self) -> impl Iterator<Item = &JobReconciliation> {
        self.per_job.iter().filter(|j| j.outcome.marks_processed())
    }
}

/// Run one reconciliation pass over a snapshot of jobs.
///
/// The caller must not run two passes over the same ledger concurrently;
/// the pass itself is synchronous and runs to completion.
pub fn reconcile(
    jobs: Vec<IngestionJob>,
    store: &mut ProductionStore,
    now: Timestamp,
) -> ReconcileOutcome {
    let mut shot_updates_applied = 0;
    let mut per_job = Vec::with_capacity(jobs.len());

    let jobs = jobs
        .into_iter()
        .map(|mut job| {
            let outcome = reconcile_job(&job, store, now);
            if outcome.marks_processed() {
                job.hive_processed_completion = true;
            }
            if let JobOutcome::Applied { shots } = &outcome {
                shot_updates_applied += shots.len();
            }
            per_job.push(JobReconciliation {
                job_id: job.job_id.clone(),
                outcome,
            });
            job
        })
        .collect();

    ReconcileOutcome {
        jobs,
        shot_updates_applied,
        per_job,
    }
}

fn reconcile_job(job: &IngestionJob, store: &mut ProductionStore, now: Timestamp) -> JobOutcome {
    if !job.awaits_reconciliation() {
        return JobOutcome::Skipped;
    }
    let Some((event_id, photographer_id)) = job.resolved_target() else {
        return JobOutcome::Unresolved;
    };

    let matched = job.matched_file_count();
    if matched <= 0 {
        return JobOutcome::NothingToApply;
    }
    if store.event(event_id).is_none() {
        return JobOutcome::UnknownEvent {
            event_id: event_id.to_string(),
        };
    }

    let limit = usize::try_from(matched).unwrap_or(usize::MAX);
    match store.capture_shots(event_id, photographer_id, limit, now) {
        Ok(shots) => JobOutcome::Applied { shots },
        Err(e) => JobOutcome::Failed {
            reason: e.to_string(),
        },
    }
}
