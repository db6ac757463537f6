//! Connectivity check for the local ingest agent.
//!
//! The agent is only ever pinged through `GET /available-drives`. Failing
//! to reach it is a status, never an error: callers get
//! [`AgentStatus::Disconnected`] and the change is logged and published.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hive_events::{EventBus, EventKind};
use serde::Deserialize;

/// A storage location the agent can ingest from or into.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveInfo {
    pub path: String,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub free_space: Option<String>,
    #[serde(default)]
    pub total_space: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvailableDrives {
    #[serde(default)]
    locations: Vec<DriveInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStatus {
    Connected { drives: Vec<DriveInfo> },
    Disconnected { reason: String },
}

impl AgentStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

pub struct AgentCheck {
    client: reqwest::Client,
    agent_url: String,
    bus: Arc<EventBus>,
    /// Connectivity seen by the previous check; `None` before the first.
    last_connected: Mutex<Option<bool>>,
}

impl AgentCheck {
    pub fn new(agent_url: impl Into<String>, timeout: Duration, bus: Arc<EventBus>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client for agent checks");
                reqwest::Client::new()
            });
        Self {
            client,
            agent_url: agent_url.into().trim_end_matches('/').to_string(),
            bus,
            last_connected: Mutex::new(None),
        }
    }

    /// Ping the agent once. Publishes `AgentConnectionChanged` when the
    /// connectivity differs from the previous check.
    pub async fn check(&self) -> AgentStatus {
        let status = match self.fetch_drives().await {
            Ok(drives) => AgentStatus::Connected { drives },
            Err(reason) => AgentStatus::Disconnected { reason },
        };

        let connected = status.is_connected();
        let changed = {
            let mut last = self.last_connected.lock().unwrap_or_else(|p| p.into_inner());
            let changed = *last != Some(connected);
            *last = Some(connected);
            changed
        };

        if changed {
            let detail = match &status {
                AgentStatus::Connected { drives } => {
                    tracing::info!(agent_url = %self.agent_url, drives = drives.len(), "Local agent connected");
                    format!("{} drive(s) available", drives.len())
                }
                AgentStatus::Disconnected { reason } => {
                    tracing::warn!(agent_url = %self.agent_url, reason = %reason, "Local agent disconnected");
                    reason.clone()
                }
            };
            self.bus
                .publish(EventKind::AgentConnectionChanged { connected, detail });
        }

        status
    }

    async fn fetch_drives(&self) -> Result<Vec<DriveInfo>, String> {
        let response = self
            .client
            .get(format!("{}/available-drives", self.agent_url))
            .send()
            .await
            .map_err(|e| format!("Could not reach local agent at {}: {e}", self.agent_url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                404 => "Local agent is running but /available-drives was not found".to_string(),
                code => format!("Local agent responded with status {code}"),
            });
        }

        let body: AvailableDrives = response
            .json()
            .await
            .map_err(|e| format!("Unreadable response from local agent: {e}"))?;
        Ok(body.locations)
    }
}
