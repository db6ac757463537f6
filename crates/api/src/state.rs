use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};
use hive_core::clock::{Clock, SystemClock};
use hive_core::ingestion::IngestionJob;
use hive_core::report::IngestionReport;
use hive_core::store::ProductionStore;
use hive_core::types::EntityId;
use hive_events::EventBus;
use indexmap::IndexMap;
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::notifications::NotificationInbox;

/// Everything the backend keeps in memory.
///
/// Held behind a single lock so a reconciliation pass reads the job ledger
/// and mutates shots without any other request interleaving.
#[derive(Debug, Default)]
pub struct HiveData {
    pub production: ProductionStore,
    /// Agent-reported jobs keyed by job id, in first-report order.
    pub jobs: IndexMap<EntityId, IngestionJob>,
    pub reports: IndexMap<EntityId, IngestionReport>,
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub data: Arc<Mutex<HiveData>>,
    /// Centralized event bus for publishing domain events.
    pub event_bus: Arc<EventBus>,
    pub inbox: Arc<NotificationInbox>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        Self::with_clock(config, event_bus, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ServerConfig, event_bus: Arc<EventBus>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: Arc::new(config),
            data: Arc::new(Mutex::new(HiveData::default())),
            event_bus,
            inbox: Arc::new(NotificationInbox::default()),
            clock,
        }
    }

    /// Current instant in the server's local zone, used when a request
    /// does not say which `now` (and zone) to evaluate statuses at.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&Local).fixed_offset()
    }
}
