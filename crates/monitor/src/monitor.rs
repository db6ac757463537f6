//! The monitor's two periodic duties.
//!
//! - [`Monitor::refresh_statuses`] fetches the watched events and updates
//!   the [`StatusBoard`]. Runs on the status tick.
//! - [`Monitor::poll_jobs`] checks the local agent and asks the backend to
//!   reconcile completed ingestion jobs. Runs on the job poll.
//!
//! Both take a fetch [`Generation`](crate::session::Generation) so a slow
//! response never overwrites a newer one.

use std::sync::Arc;

use chrono::{DateTime, Local};
use hive_core::clock::Clock;
use hive_events::AppSelection;
use tokio::sync::Mutex;

use crate::agent_check::AgentCheck;
use crate::board::{StatusBoard, StatusTransition};
use crate::client::{BackendClient, ClientError, ReconcileSummary};
use crate::session::SyncSession;

/// Result of one job poll.
#[derive(Debug)]
pub enum PollOutcome {
    Reconciled(ReconcileSummary),
    /// Another poll was still outstanding.
    Busy,
    /// A newer poll already reported back.
    Stale,
}

pub struct Monitor {
    client: BackendClient,
    agent: AgentCheck,
    selection: Arc<AppSelection>,
    clock: Arc<dyn Clock>,
    board: Mutex<StatusBoard>,
    events_session: SyncSession,
    jobs_session: SyncSession,
}

impl Monitor {
    pub fn new(
        client: BackendClient,
        agent: AgentCheck,
        selection: Arc<AppSelection>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            agent,
            selection,
            clock,
            board: Mutex::new(StatusBoard::new()),
            events_session: SyncSession::new(),
            jobs_session: SyncSession::new(),
        }
    }

    pub fn board(&self) -> &Mutex<StatusBoard> {
        &self.board
    }

    fn local_now(&self) -> DateTime<Local> {
        self.clock.now().with_timezone(&Local)
    }

    /// Fetch events for the selected project and re-derive their statuses.
    ///
    /// Returns `Ok(None)` when the response was superseded by a newer fetch.
    pub async fn refresh_statuses(&self) -> Result<Option<Vec<StatusTransition>>, ClientError> {
        let generation = self.events_session.begin_fetch();
        let project_id = self.selection.current().project_id;
        let events = self.client.list_events(project_id.as_deref()).await?;

        if !self.events_session.try_apply(generation) {
            tracing::debug!(generation = generation.value(), "Discarding stale event fetch");
            return Ok(None);
        }

        let now = self.local_now();
        let transitions = self.board.lock().await.refresh(&events, &now);
        Ok(Some(transitions))
    }

    /// Check the agent, then run one reconciliation pass on the backend.
    ///
    /// An agent that cannot be reached does not stop the pass: jobs it
    /// already reported are still reconciled.
    pub async fn poll_jobs(&self) -> Result<PollOutcome, ClientError> {
        let Some(_refresh) = self.jobs_session.begin_refresh() else {
            tracing::debug!("Job poll already in flight, skipping");
            return Ok(PollOutcome::Busy);
        };

        self.agent.check().await;

        let generation = self.jobs_session.begin_fetch();
        let summary = self.client.reconcile().await?;
        if !self.jobs_session.try_apply(generation) {
            return Ok(PollOutcome::Stale);
        }

        if summary.shot_updates_applied > 0 {
            tracing::info!(
                shots_updated = summary.shot_updates_applied,
                jobs = summary.jobs.len(),
                "Ingestion jobs reconciled",
            );
        } else {
            tracing::debug!(jobs = summary.jobs.len(), "No ingestion updates to apply");
        }
        Ok(PollOutcome::Reconciled(summary))
    }
}
