//! Explicit owner of the user's current organization/project selection.
//!
//! Consumers read the selection through [`AppSelection::current`] and learn
//! about changes by subscribing to the bus for
//! [`EventKind::SelectionChanged`].

use std::sync::{Arc, RwLock};

use hive_core::types::EntityId;
use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, EventKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub organization_id: Option<EntityId>,
    pub project_id: Option<EntityId>,
}

pub struct AppSelection {
    state: RwLock<Selection>,
    bus: Arc<EventBus>,
}

impl AppSelection {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self::with_initial(bus, Selection::default())
    }

    pub fn with_initial(bus: Arc<EventBus>, initial: Selection) -> Self {
        Self {
            state: RwLock::new(initial),
            bus,
        }
    }

    pub fn current(&self) -> Selection {
        self.state
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Switch organization. The project selection is cleared when the
    /// organization actually changes.
    pub fn select_organization(&self, organization_id: Option<EntityId>) -> bool {
        self.update(|s| {
            if s.organization_id != organization_id {
                s.organization_id = organization_id;
                s.project_id = None;
            }
        })
    }

    pub fn select_project(&self, project_id: Option<EntityId>) -> bool {
        self.update(|s| s.project_id = project_id)
    }

    /// Apply `change`, publishing `SelectionChanged` only when something
    /// differs afterwards. Returns whether it did.
    fn update(&self, change: impl FnOnce(&mut Selection)) -> bool {
        let next = {
            let mut state = self.state.write().unwrap_or_else(|p| p.into_inner());
            let before = state.clone();
            change(&mut *state);
            if *state == before {
                return false;
            }
            state.clone()
        };

        tracing::debug!(
            organization_id = ?next.organization_id,
            project_id = ?next.project_id,
            "Selection changed",
        );
        self.bus.publish(EventKind::SelectionChanged {
            organization_id: next.organization_id,
            project_id: next.project_id,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn selecting_project_publishes_change() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let selection = AppSelection::new(Arc::clone(&bus));

        assert!(selection.select_project(Some("proj1".into())));
        let event = rx.try_recv().unwrap();
        assert_eq!(
            event.kind,
            EventKind::SelectionChanged {
                organization_id: None,
                project_id: Some("proj1".into()),
            }
        );
        assert_eq!(selection.current().project_id.as_deref(), Some("proj1"));
    }

    #[test]
    fn unchanged_selection_is_silent() {
        let bus = Arc::new(EventBus::default());
        let selection = AppSelection::new(Arc::clone(&bus));
        selection.select_project(Some("proj1".into()));

        let mut rx = bus.subscribe();
        assert!(!selection.select_project(Some("proj1".into())));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn switching_organization_clears_project() {
        let bus = Arc::new(EventBus::default());
        let selection = AppSelection::with_initial(
            bus,
            Selection {
                organization_id: Some("org1".into()),
                project_id: Some("proj1".into()),
            },
        );
        selection.select_organization(Some("org2".into()));
        assert_eq!(
            selection.current(),
            Selection {
                organization_id: Some("org2".into()),
                project_id: None,
            }
        );
    }
}
