//! Periodic reconciliation of completed ingestion jobs.
//!
//! Each pass takes the data lock, snapshots the job ledger, applies it to
//! shot state and writes the updated jobs back before releasing the lock.
//! Passes triggered by the timer and by `POST /ingest-jobs/reconcile` are
//! therefore serialised and cannot both see a job as unprocessed.

use std::time::Duration;

use hive_core::reconcile::{reconcile, JobOutcome, ReconcileOutcome};
use hive_events::EventKind;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Run one reconciliation pass over the whole job ledger.
pub async fn reconcile_once(state: &AppState) -> ReconcileOutcome {
    let outcome = {
        let mut data = state.data.lock().await;
        let snapshot = data.jobs.values().cloned().collect();
        let outcome = reconcile(snapshot, &mut data.production, state.clock.now());
        for job in &outcome.jobs {
            data.jobs.insert(job.job_id.clone(), job.clone());
        }
        outcome
    };

    for entry in &outcome.per_job {
        match &entry.outcome {
            JobOutcome::Applied { shots } => {
                tracing::info!(job_id = %entry.job_id, shots_updated = shots.len(), "Ingestion job reconciled");
                state.event_bus.publish(EventKind::JobReconciled {
                    job_id: entry.job_id.clone(),
                    shots_updated: shots.len(),
                });
            }
            JobOutcome::NothingToApply => {
                tracing::info!(job_id = %entry.job_id, "Ingestion job had no matched files");
                state.event_bus.publish(EventKind::JobReconciled {
                    job_id: entry.job_id.clone(),
                    shots_updated: 0,
                });
            }
            JobOutcome::Unresolved => {
                tracing::debug!(job_id = %entry.job_id, "Completed job missing event or photographer, will retry");
            }
            JobOutcome::UnknownEvent { event_id } => {
                tracing::warn!(job_id = %entry.job_id, event_id = %event_id, "Completed job refers to unknown event, marked processed");
                state.event_bus.publish(EventKind::JobReconciled {
                    job_id: entry.job_id.clone(),
                    shots_updated: 0,
                });
            }
            JobOutcome::Failed { reason } => {
                tracing::error!(job_id = %entry.job_id, reason = %reason, "Could not apply ingestion job, will retry");
            }
            JobOutcome::Skipped => {}
        }
    }

    outcome
}

/// Run the reconciliation loop until `cancel` is triggered.
pub async fn run(state: AppState, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Reconciliation job started");

    let mut interval = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reconciliation job stopping");
                break;
            }
            _ = interval.tick() => {
                let outcome = reconcile_once(&state).await;
                if outcome.shot_updates_applied > 0 {
                    tracing::info!(shots_updated = outcome.shot_updates_applied, "Reconciliation pass applied updates");
                } else {
                    tracing::debug!("Reconciliation pass: nothing to apply");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ServerConfig;
    use hive_core::ingestion::{IngestionJobReport, IngestionJobStatus};
    use hive_core::store::ProductionStore;
    use hive_events::EventBus;

    fn test_state() -> AppState {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec![],
            request_timeout_secs: 30,
            reconcile_interval_secs: 0,
        };
        AppState::new(config, Arc::new(EventBus::default()))
    }

    async fn seed(state: &AppState, shots: usize) -> String {
        let mut data = state.data.lock().await;
        let event = data
            .production
            .create_event(serde_json::from_value(serde_json::json!({
                "name": "Keynote",
                "projectId": "proj1",
                "date": "2024-07-15",
            })).unwrap())
            .unwrap();
        for i in 0..shots {
            data.production
                .create_shot(
                    serde_json::from_value(serde_json::json!({
                        "eventId": event.id,
                        "description": format!("Shot {i}"),
                    }))
                    .unwrap(),
                    state.clock.now(),
                )
                .unwrap();
        }
        let job = IngestionJobReport {
            job_id: "job1".into(),
            status: Some(IngestionJobStatus::Completed),
            files_matched_to_events: Some(2),
            determined_event_id: Some(event.id.clone()),
            determined_photographer_id: Some("p1".into()),
            ..Default::default()
        }
        .into_job(state.clock.now())
        .unwrap();
        data.jobs.insert(job.job_id.clone(), job);
        event.id
    }

    fn captured(store: &ProductionStore) -> usize {
        store.shots().filter(|s| s.status.is_captured()).count()
    }

    #[tokio::test]
    async fn concurrent_passes_apply_once() {
        let state = test_state();
        seed(&state, 3).await;

        let (a, b) = tokio::join!(reconcile_once(&state), reconcile_once(&state));
        assert_eq!(a.shot_updates_applied + b.shot_updates_applied, 2);

        let data = state.data.lock().await;
        assert_eq!(captured(&data.production), 2);
        assert!(data.jobs["job1"].hive_processed_completion);
    }

    #[tokio::test]
    async fn publishes_reconciled_event() {
        let state = test_state();
        let mut rx = state.event_bus.subscribe();
        seed(&state, 1).await;

        reconcile_once(&state).await;
        let event = rx.recv().await.unwrap();
        assert_eq!(
            event.kind,
            EventKind::JobReconciled {
                job_id: "job1".into(),
                shots_updated: 1,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn loop_runs_until_cancelled() {
        let state = test_state();
        seed(&state, 3).await;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(state.clone(), Duration::from_secs(30), cancel.clone()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(captured(&state.data.lock().await.production), 2);

        cancel.cancel();
        handle.await.unwrap();
    }
}
