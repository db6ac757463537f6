//! In-memory event and shot request store.
//!
//! [`ProductionStore`] is the only owner of events and shots. Shot status
//! changes go through [`ShotRequest::transition`]; nothing here assigns a
//! status directly. The per-event `shot_requests` count is recomputed from
//! the shot list after every insert or removal.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::CoreError;
use crate::event::{Event, EventUpdate, NewEvent, StageChange};
use crate::shot_request::{
    NewShotRequest, ShotRequest, ShotRequestUpdate, ShotStatus, StatusChange, TransitionOutcome,
};
use crate::types::{EntityId, Timestamp};

/// A shot entered `Request More` and someone should be told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoreRequested {
    pub shot_id: EntityId,
    pub event_id: EntityId,
    /// The shot's assignee, else the event's first assigned person.
    pub recipient_id: Option<EntityId>,
    pub description: String,
}

/// Result of creating or updating a shot.
#[derive(Debug, Clone)]
pub struct ShotMutation {
    pub shot: ShotRequest,
    pub transition: Option<TransitionOutcome>,
    pub more_requested: Option<MoreRequested>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductionStore {
    events: IndexMap<EntityId, Event>,
    /// Shots per event id, in creation order.
    shots: IndexMap<EntityId, Vec<ShotRequest>>,
}

impl ProductionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /* ----------------------------------------------------------------------
    Events
    ---------------------------------------------------------------------- */

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn events_for_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a Event> {
        self.events.values().filter(move |e| e.project_id == project_id)
    }

    /// Insert a fully formed event, e.g. when seeding from saved data.
    pub fn insert_event(&mut self, mut event: Event) -> Result<&Event, CoreError> {
        if self.events.contains_key(&event.id) {
            return Err(CoreError::Conflict(format!("Event '{}' already exists", event.id)));
        }
        event.shot_requests = self.shots.get(&event.id).map_or(0, Vec::len);
        let id = event.id.clone();
        Ok(self.events.entry(id).or_insert(event))
    }

    pub fn create_event(&mut self, new: NewEvent) -> Result<Event, CoreError> {
        validator::Validate::validate(&new)?;
        let event = new.into_event(Uuid::now_v7().to_string());
        self.insert_event(event).cloned()
    }

    /// Apply a partial update. The returned stage change lets callers log
    /// regressions.
    pub fn update_event(
        &mut self,
        id: &str,
        update: EventUpdate,
    ) -> Result<(Event, Option<StageChange>), CoreError> {
        validator::Validate::validate(&update)?;
        let event = self
            .events
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("event", id))?;
        let change = update.apply(event);
        Ok((event.clone(), change))
    }

    /// Delete an event and every shot request attached to it.
    pub fn delete_event(&mut self, id: &str) -> Result<(Event, Vec<ShotRequest>), CoreError> {
        let event = self
            .events
            .shift_remove(id)
            .ok_or_else(|| CoreError::not_found("event", id))?;
        let shots = self.shots.shift_remove(id).unwrap_or_default();
        Ok((event, shots))
    }

    pub fn check_in(&mut self, event_id: &str, personnel_id: &str, at: Timestamp) -> Result<Event, CoreError> {
        let event = self
            .events
            .get_mut(event_id)
            .ok_or_else(|| CoreError::not_found("event", event_id))?;
        event.check_in(personnel_id, at);
        Ok(event.clone())
    }

    /// Check a person out. A person who never checked in is left alone;
    /// the second value reports whether anything changed.
    pub fn check_out(
        &mut self,
        event_id: &str,
        personnel_id: &str,
        at: Timestamp,
    ) -> Result<(Event, bool), CoreError> {
        let event = self
            .events
            .get_mut(event_id)
            .ok_or_else(|| CoreError::not_found("event", event_id))?;
        let changed = event.check_out(personnel_id, at);
        Ok((event.clone(), changed))
    }

    /* ----------------------------------------------------------------------
    Shot requests
    ---------------------------------------------------------------------- */

    pub fn shots(&self) -> impl Iterator<Item = &ShotRequest> {
        self.shots.values().flatten()
    }

    pub fn shots_for_event(&self, event_id: &str) -> &[ShotRequest] {
        self.shots.get(event_id).map_or(&[], Vec::as_slice)
    }

    pub fn shot(&self, id: &str) -> Option<&ShotRequest> {
        self.shots().find(|s| s.id == id)
    }

    /// Insert a fully formed shot, e.g. when seeding from saved data.
    pub fn insert_shot(&mut self, shot: ShotRequest) -> Result<(), CoreError> {
        if !self.events.contains_key(&shot.event_id) {
            return Err(CoreError::not_found("event", shot.event_id.as_str()));
        }
        if self.shot(&shot.id).is_some() {
            return Err(CoreError::Conflict(format!("Shot request '{}' already exists", shot.id)));
        }
        let event_id = shot.event_id.clone();
        self.shots.entry(event_id.clone()).or_default().push(shot);
        self.recompute_shot_count(&event_id);
        Ok(())
    }

    pub fn create_shot(&mut self, new: NewShotRequest, at: Timestamp) -> Result<ShotMutation, CoreError> {
        if !self.events.contains_key(&new.event_id) {
            return Err(CoreError::not_found("event", new.event_id.as_str()));
        }
        let shot = new.into_shot(Uuid::now_v7().to_string(), at)?;
        let more_requested = (shot.status == ShotStatus::RequestMore)
            .then(|| self.more_requested(&shot));
        self.insert_shot(shot.clone())?;
        Ok(ShotMutation {
            shot,
            transition: None,
            more_requested,
        })
    }

    /// Update a shot through the state machine.
    ///
    /// Rejected when the shot or its owning event no longer exists.
    pub fn update_shot(
        &mut self,
        id: &str,
        update: ShotRequestUpdate,
        at: Timestamp,
    ) -> Result<ShotMutation, CoreError> {
        let (event_id, index) = self
            .locate_shot(id)
            .ok_or_else(|| CoreError::not_found("shot request", id))?;
        if !self.events.contains_key(&event_id) {
            return Err(CoreError::not_found("event", event_id));
        }

        let shot = &mut self.shots[event_id.as_str()][index];
        let transition = update.apply(shot, at)?;
        let shot = shot.clone();

        let more_requested = transition
            .filter(TransitionOutcome::requested_more)
            .map(|_| self.more_requested(&shot));
        Ok(ShotMutation {
            shot,
            transition,
            more_requested,
        })
    }

    pub fn delete_shot(&mut self, id: &str) -> Result<ShotRequest, CoreError> {
        let (event_id, index) = self
            .locate_shot(id)
            .ok_or_else(|| CoreError::not_found("shot request", id))?;
        let list = self
            .shots
            .get_mut(&event_id)
            .ok_or_else(|| CoreError::Internal(format!("Shot list for event '{event_id}' vanished")))?;
        let shot = list.remove(index);
        if list.is_empty() {
            self.shots.shift_remove(&event_id);
        }
        self.recompute_shot_count(&event_id);
        Ok(shot)
    }

    /// Mark up to `limit` capture candidates of an event as `Captured`, in
    /// list order. Returns the ids of the shots changed.
    pub fn capture_shots(
        &mut self,
        event_id: &str,
        photographer_id: &str,
        limit: usize,
        at: Timestamp,
    ) -> Result<Vec<EntityId>, CoreError> {
        if !self.events.contains_key(event_id) {
            return Err(CoreError::not_found("event", event_id));
        }
        let Some(list) = self.shots.get_mut(event_id) else {
            return Ok(Vec::new());
        };

        let mut captured = Vec::new();
        for shot in list
            .iter_mut()
            .filter(|s| s.status.is_capture_candidate())
            .take(limit)
        {
            shot.transition(StatusChange {
                status: ShotStatus::Captured,
                actor_id: photographer_id,
                blocked_reason: None,
                at,
            })?;
            captured.push(shot.id.clone());
        }
        Ok(captured)
    }

    fn locate_shot(&self, id: &str) -> Option<(EntityId, usize)> {
        self.shots.iter().find_map(|(event_id, list)| {
            list.iter()
                .position(|s| s.id == id)
                .map(|index| (event_id.clone(), index))
        })
    }

    fn recompute_shot_count(&mut self, event_id: &str) {
        let count = self.shots.get(event_id).map_or(0, Vec::len);
        if let Some(event) = self.events.get_mut(event_id) {
            event.shot_requests = count;
        }
    }

    fn more_requested(&self, shot: &ShotRequest) -> MoreRequested {
        let recipient_id = shot.assigned_personnel_id.clone().or_else(|| {
            self.events
                .get(&shot.event_id)
                .and_then(|e| e.first_assigned().cloned())
        });
        MoreRequested {
            shot_id: shot.id.clone(),
            event_id: shot.event_id.clone(),
            recipient_id,
            description: shot.description.clone(),
        }
    }
}
