//! Scheduled production events and their personnel activity.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::clock::{hhmm, hhmm_patch};
use crate::event_status::{self, EventStatus, DEFAULT_STATIC_STATUS};
use crate::process_point::ProcessPoint;
use crate::types::{EntityId, Timestamp};

/* --------------------------------------------------------------------------
Types
-------------------------------------------------------------------------- */

/// Check-in/check-out record of one person at one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelActivity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EntityId,
    pub name: String,
    pub project_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<EntityId>,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Static label used when the event has no complete time window.
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub process_point: ProcessPoint,
    #[serde(default)]
    pub is_quick_turnaround: bool,
    /// Free text or an ISO timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub assigned_personnel_ids: Vec<EntityId>,
    #[serde(default = "default_covered")]
    pub is_covered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discipline: Option<String>,
    #[serde(default)]
    pub personnel_activity: IndexMap<EntityId, PersonnelActivity>,
    /// Number of shot requests attached to this event. Maintained by the store.
    #[serde(default)]
    pub shot_requests: usize,
}

fn default_status() -> String {
    DEFAULT_STATIC_STATUS.to_string()
}

fn default_covered() -> bool {
    true
}

impl Event {
    /// Status at `now`, derived from the time window when it is complete.
    pub fn derived_status<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> EventStatus {
        event_status::derive_status(now, self.date, self.start_time, self.end_time, &self.status)
    }

    /// Whether the event window has closed at `now`.
    pub fn is_done<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        event_status::has_ended(now, self.date, self.start_time, self.end_time)
    }

    /// Instant at which the event starts, if it has a start time.
    pub fn starts_at<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        let start = self.start_time?;
        event_status::combine(tz, self.date.and_time(start))
    }

    pub fn first_assigned(&self) -> Option<&EntityId> {
        self.assigned_personnel_ids.first()
    }

    /// Record a check-in. Any previous check-out is cleared.
    pub fn check_in(&mut self, personnel_id: &str, at: Timestamp) {
        let activity = self
            .personnel_activity
            .entry(personnel_id.to_string())
            .or_default();
        activity.check_in_time = Some(at);
        activity.check_out_time = None;
    }

    /// Record a check-out. Returns `false` (and changes nothing) when the
    /// person never checked in.
    pub fn check_out(&mut self, personnel_id: &str, at: Timestamp) -> bool {
        match self.personnel_activity.get_mut(personnel_id) {
            Some(activity) if activity.check_in_time.is_some() => {
                activity.check_out_time = Some(at);
                true
            }
            _ => false,
        }
    }
}

/// Observed process-point change on an event or shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChange {
    pub from: ProcessPoint,
    pub to: ProcessPoint,
}

impl StageChange {
    pub fn is_regression(&self) -> bool {
        self.from.is_regression(self.to)
    }
}

/* --------------------------------------------------------------------------
Create / update DTOs
-------------------------------------------------------------------------- */

/// Body for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[validate(length(min = 1, message = "Event name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Project id must not be empty"))]
    pub project_id: EntityId,
    pub organization_id: Option<EntityId>,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub process_point: Option<ProcessPoint>,
    #[serde(default)]
    pub is_quick_turnaround: bool,
    pub deadline: Option<String>,
    #[serde(default)]
    pub assigned_personnel_ids: Vec<EntityId>,
    pub is_covered: Option<bool>,
    pub discipline: Option<String>,
}

impl NewEvent {
    pub fn into_event(self, id: EntityId) -> Event {
        Event {
            id,
            name: self.name.trim().to_string(),
            project_id: self.project_id,
            organization_id: self.organization_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            description: self.description,
            status: self
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(default_status),
            process_point: self.process_point.unwrap_or_default(),
            is_quick_turnaround: self.is_quick_turnaround,
            deadline: self.deadline,
            assigned_personnel_ids: dedup_ids(self.assigned_personnel_ids),
            is_covered: self.is_covered.unwrap_or(true),
            discipline: self.discipline.filter(|d| !d.is_empty()),
            personnel_activity: IndexMap::new(),
            shot_requests: 0,
        }
    }
}

/// Partial event update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[validate(length(min = 1, message = "Event name must not be empty"))]
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the time, so status falls back to the static label.
    #[serde(default, deserialize_with = "hhmm_patch::deserialize")]
    pub start_time: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "hhmm_patch::deserialize")]
    pub end_time: Option<Option<NaiveTime>>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub process_point: Option<ProcessPoint>,
    pub is_quick_turnaround: Option<bool>,
    pub deadline: Option<String>,
    pub assigned_personnel_ids: Option<Vec<EntityId>>,
    pub is_covered: Option<bool>,
    pub discipline: Option<String>,
    /// Merged into the existing activity map, keyed by personnel id.
    pub personnel_activity: Option<IndexMap<EntityId, PersonnelActivity>>,
}

impl EventUpdate {
    /// Apply the update in place. Returns the stage change, if any.
    pub fn apply(self, event: &mut Event) -> Option<StageChange> {
        if let Some(name) = self.name {
            event.name = name.trim().to_string();
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            event.end_time = end_time;
        }
        if self.location.is_some() {
            event.location = self.location;
        }
        if self.description.is_some() {
            event.description = self.description;
        }
        if let Some(status) = self.status.filter(|s| !s.trim().is_empty()) {
            event.status = status;
        }
        if let Some(flag) = self.is_quick_turnaround {
            event.is_quick_turnaround = flag;
        }
        if self.deadline.is_some() {
            event.deadline = self.deadline;
        }
        if let Some(ids) = self.assigned_personnel_ids {
            event.assigned_personnel_ids = dedup_ids(ids);
        }
        if let Some(flag) = self.is_covered {
            event.is_covered = flag;
        }
        if let Some(discipline) = self.discipline {
            event.discipline = Some(discipline).filter(|d| !d.is_empty());
        }
        if let Some(activity) = self.personnel_activity {
            event.personnel_activity.extend(activity);
        }

        let next = self.process_point?;
        let change = StageChange {
            from: event.process_point,
            to: next,
        };
        event.process_point = next;
        (change.from != change.to).then_some(change)
    }
}

/// Drop blanks and duplicates while keeping first-seen order.
fn dedup_ids(ids: Vec<EntityId>) -> Vec<EntityId> {
    let mut out: Vec<EntityId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !id.trim().is_empty() && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
