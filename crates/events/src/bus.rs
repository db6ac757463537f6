//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`HiveEvent`]s. Share it
//! via `Arc<EventBus>`; every subscriber receives every event published
//! after it subscribed.

use chrono::{DateTime, Utc};
use hive_core::process_point::ProcessPoint;
use hive_core::shot_request::ShotStatus;
use hive_core::types::EntityId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// HiveEvent
// ---------------------------------------------------------------------------

/// Typed payload of a bus event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A shot entered `Request More`.
    ShotMoreRequested {
        shot_id: EntityId,
        event_id: EntityId,
        recipient_id: Option<EntityId>,
        description: String,
        requested_by: Option<EntityId>,
    },
    ShotStatusChanged {
        shot_id: EntityId,
        event_id: EntityId,
        from: ShotStatus,
        to: ShotStatus,
        actor_id: Option<EntityId>,
    },
    EventStageChanged {
        event_id: EntityId,
        from: ProcessPoint,
        to: ProcessPoint,
        regression: bool,
    },
    /// A completed ingestion job was applied to shot state.
    JobReconciled { job_id: EntityId, shots_updated: usize },
    SelectionChanged {
        organization_id: Option<EntityId>,
        project_id: Option<EntityId>,
    },
    AgentConnectionChanged { connected: bool, detail: String },
}

impl EventKind {
    /// Dot-separated name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShotMoreRequested { .. } => "shot.more_requested",
            Self::ShotStatusChanged { .. } => "shot.status_changed",
            Self::EventStageChanged { .. } => "event.stage_changed",
            Self::JobReconciled { .. } => "ingest.job_reconciled",
            Self::SelectionChanged { .. } => "selection.changed",
            Self::AgentConnectionChanged { .. } => "agent.connection_changed",
        }
    }
}

/// An event that occurred in the application, stamped on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiveEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl HiveEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl From<EventKind> for HiveEvent {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use hive_events::bus::{EventBus, EventKind};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(EventKind::JobReconciled { job_id: "job1".into(), shots_updated: 2 });
/// ```
pub struct EventBus {
    sender: broadcast::Sender<HiveEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Without subscribers the
    /// event is dropped.
    pub fn publish(&self, event: impl Into<HiveEvent>) {
        let event = event.into();
        tracing::trace!(event = event.name(), "Publishing bus event");
        // A send error only means there are no receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HiveEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
