use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use hive_core::types::EntityId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Notification type for shots that need another pass.
pub const KIND_SHOT_MORE_REQUESTED: &str = "shot_more_requested";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: EntityId,
    pub recipient_id: EntityId,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(recipient_id: impl Into<EntityId>, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            recipient_id: recipient_id.into(),
            kind: kind.into(),
            message: message.into(),
            job_id: None,
            shot_id: None,
            event_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Notifications kept before the oldest are evicted.
pub const DEFAULT_RETENTION: usize = 500;

/// In-memory notification store.
///
/// Holds at most `retention` entries; pushing beyond that drops the
/// oldest. Recipients remove entries they have dealt with via
/// [`NotificationInbox::dismiss`].
#[derive(Debug)]
pub struct NotificationInbox {
    entries: RwLock<VecDeque<Notification>>,
    retention: usize,
}

impl Default for NotificationInbox {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }
}

impl NotificationInbox {
    pub fn with_retention(retention: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            retention: retention.max(1),
        }
    }

    pub async fn push(&self, notification: Notification) {
        let mut entries = self.entries.write().await;
        while entries.len() >= self.retention {
            if let Some(evicted) = entries.pop_front() {
                tracing::debug!(notification_id = %evicted.id, "Inbox full, dropping oldest notification");
            }
        }
        entries.push_back(notification);
    }

    /// Remove one notification. Returns `false` when it is not held.
    pub async fn dismiss(&self, id: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.iter().position(|n| n.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Notifications for one recipient, oldest first.
    pub async fn for_recipient(&self, recipient_id: &str) -> Vec<Notification> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect()
    }

    pub async fn all(&self) -> Vec<Notification> {
        self.entries.read().await.iter().cloned().collect()
    }
}
