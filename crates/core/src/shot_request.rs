//! Shot requests and their status state machine.
//!
//! Any status may be set from any other. Each change carries side effects
//! that are applied together with the new status so the side-effect fields
//! never disagree with it:
//!
//! - leaving `Blocked` clears `blocked_reason`; entering it requires one
//! - the first move into `Captured`/`Completed` records the capturer
//! - moving out of `Captured`/`Completed` to anything else clears the capturer
//! - every change stamps the modifier and the time

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::clock::{hhmm, hhmm_patch};
use crate::error::CoreError;
use crate::process_point::ProcessPoint;
use crate::types::{EntityId, Timestamp};

/* --------------------------------------------------------------------------
Enums
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShotStatus {
    #[default]
    Unassigned,
    Assigned,
    Captured,
    Blocked,
    #[serde(rename = "Request More")]
    RequestMore,
    Completed,
}

impl ShotStatus {
    pub const ALL: [ShotStatus; 6] = [
        ShotStatus::Unassigned,
        ShotStatus::Assigned,
        ShotStatus::Captured,
        ShotStatus::Blocked,
        ShotStatus::RequestMore,
        ShotStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "Unassigned",
            Self::Assigned => "Assigned",
            Self::Captured => "Captured",
            Self::Blocked => "Blocked",
            Self::RequestMore => "Request More",
            Self::Completed => "Completed",
        }
    }

    /// `Captured` or `Completed`: the shot has been taken.
    pub fn is_captured(self) -> bool {
        matches!(self, Self::Captured | Self::Completed)
    }

    /// Shots an ingestion job may still mark as captured.
    pub fn is_capture_candidate(self) -> bool {
        matches!(self, Self::Unassigned | Self::Assigned)
    }
}

impl fmt::Display for ShotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/* --------------------------------------------------------------------------
ShotRequest
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotRequest {
    pub id: EntityId,
    /// Owning event. Fixed at creation.
    pub event_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: ShotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_personnel_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Non-empty exactly while `status` is `Blocked`.
    #[serde(default)]
    pub blocked_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_capturer_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status_modifier_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status_modified_at: Option<Timestamp>,
    /// Shot-level stage. Falls back to the event's stage when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_point: Option<ProcessPoint>,
    #[serde(default, with = "hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub quick_turn: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

/// A requested status change and who performs it.
#[derive(Debug, Clone, Copy)]
pub struct StatusChange<'a> {
    pub status: ShotStatus,
    pub actor_id: &'a str,
    /// Reason to record when moving to `Blocked`. The current reason is
    /// kept when this is absent.
    pub blocked_reason: Option<&'a str>,
    pub at: Timestamp,
}

/// What a status change did, beyond the fields it set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub previous: ShotStatus,
    pub current: ShotStatus,
}

impl TransitionOutcome {
    /// The shot just entered `Request More`.
    pub fn requested_more(&self) -> bool {
        self.current == ShotStatus::RequestMore && self.previous != ShotStatus::RequestMore
    }
}

impl ShotRequest {
    /// Apply a status change with its side effects.
    ///
    /// Validation happens before any field is touched, so a rejected
    /// change leaves the shot exactly as it was.
    pub fn transition(&mut self, change: StatusChange<'_>) -> Result<TransitionOutcome, CoreError> {
        let actor = change.actor_id.trim();
        if actor.is_empty() {
            return Err(CoreError::Validation(
                "An acting user is required to change a shot's status".to_string(),
            ));
        }

        let blocked_reason = if change.status == ShotStatus::Blocked {
            let reason = change
                .blocked_reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .or_else(|| Some(self.blocked_reason.trim()).filter(|r| !r.is_empty()))
                .ok_or_else(|| {
                    CoreError::Validation("A reason is required to mark a shot as Blocked".to_string())
                })?;
            reason.to_string()
        } else {
            String::new()
        };

        let previous = self.status;
        self.status = change.status;
        self.blocked_reason = blocked_reason;

        if change.status.is_captured() {
            if self.initial_capturer_id.is_none() {
                self.initial_capturer_id = Some(actor.to_string());
            }
        } else if previous.is_captured() {
            self.initial_capturer_id = None;
        }

        self.last_status_modifier_id = Some(actor.to_string());
        self.last_status_modified_at = Some(change.at);

        Ok(TransitionOutcome {
            previous,
            current: change.status,
        })
    }

    /// This shot's stage, or `event_stage` when it has none of its own.
    pub fn effective_process_point(&self, event_stage: ProcessPoint) -> ProcessPoint {
        self.process_point.unwrap_or(event_stage)
    }
}

/// Captured/total counts for a set of shots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotProgress {
    pub captured: usize,
    pub total: usize,
}

pub fn shot_progress<'a>(shots: impl IntoIterator<Item = &'a ShotRequest>) -> ShotProgress {
    shots.into_iter().fold(ShotProgress::default(), |mut acc, shot| {
        acc.total += 1;
        if shot.status.is_captured() {
            acc.captured += 1;
        }
        acc
    })
}

/* --------------------------------------------------------------------------
Create / update DTOs
-------------------------------------------------------------------------- */

/// Body for creating a shot request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewShotRequest {
    #[validate(length(min = 1, message = "Event id must not be empty"))]
    pub event_id: EntityId,
    pub title: Option<String>,
    #[validate(length(min = 3, message = "Description must be at least 3 characters."))]
    pub description: String,
    pub priority: Option<Priority>,
    pub status: Option<ShotStatus>,
    pub assigned_personnel_id: Option<EntityId>,
    pub notes: Option<String>,
    pub blocked_reason: Option<String>,
    pub process_point: Option<ProcessPoint>,
    #[serde(default, with = "hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub quick_turn: bool,
    pub deadline: Option<String>,
    /// Identity recorded as the status modifier (and capturer, if created captured).
    pub actor_id: Option<EntityId>,
}

impl NewShotRequest {
    /// Build the shot in its initial state, running the same side effects
    /// as a status change when a non-default status is requested.
    pub fn into_shot(self, id: EntityId, at: Timestamp) -> Result<ShotRequest, CoreError> {
        self.validate()?;

        let mut shot = ShotRequest {
            id,
            event_id: self.event_id,
            title: non_blank(self.title),
            description: self.description.trim().to_string(),
            priority: self.priority.unwrap_or_default(),
            status: ShotStatus::Unassigned,
            assigned_personnel_id: non_blank(self.assigned_personnel_id),
            notes: non_blank(self.notes),
            blocked_reason: String::new(),
            initial_capturer_id: None,
            last_status_modifier_id: None,
            last_status_modified_at: None,
            process_point: self.process_point,
            start_time: self.start_time,
            quick_turn: self.quick_turn,
            deadline: non_blank(self.deadline),
        };

        let status = self.status.unwrap_or_default();
        if status != ShotStatus::Unassigned {
            shot.transition(StatusChange {
                status,
                actor_id: self.actor_id.as_deref().unwrap_or_default(),
                blocked_reason: self.blocked_reason.as_deref(),
                at,
            })?;
        }
        Ok(shot)
    }
}

/// Partial shot update. `event_id` is deliberately absent: a shot never
/// moves between events.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShotRequestUpdate {
    pub title: Option<String>,
    #[validate(length(min = 3, message = "Description must be at least 3 characters."))]
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<ShotStatus>,
    /// `Some("")` clears the assignment.
    pub assigned_personnel_id: Option<String>,
    pub notes: Option<String>,
    pub blocked_reason: Option<String>,
    pub process_point: Option<ProcessPoint>,
    /// `Some(None)` clears the shot time, so it follows its event's start.
    #[serde(default, deserialize_with = "hhmm_patch::deserialize")]
    pub start_time: Option<Option<NaiveTime>>,
    pub quick_turn: Option<bool>,
    pub deadline: Option<String>,
    pub actor_id: Option<EntityId>,
}

impl ShotRequestUpdate {
    /// Apply to `shot`. All validation happens before mutation.
    pub fn apply(
        self,
        shot: &mut ShotRequest,
        at: Timestamp,
    ) -> Result<Option<TransitionOutcome>, CoreError> {
        self.validate()?;

        // Run the transition on a scratch copy so a rejected status change
        // cannot leave the other fields half-applied.
        let mut next = shot.clone();
        let outcome = match self.status {
            Some(status) => Some(next.transition(StatusChange {
                status,
                actor_id: self.actor_id.as_deref().unwrap_or_default(),
                blocked_reason: self.blocked_reason.as_deref(),
                at,
            })?),
            None => {
                if next.status == ShotStatus::Blocked {
                    if let Some(reason) = self.blocked_reason.as_deref().map(str::trim) {
                        if reason.is_empty() {
                            return Err(CoreError::Validation(
                                "A reason is required to mark a shot as Blocked".to_string(),
                            ));
                        }
                        next.blocked_reason = reason.to_string();
                    }
                }
                None
            }
        };

        if self.title.is_some() {
            next.title = non_blank(self.title);
        }
        if let Some(description) = self.description {
            next.description = description.trim().to_string();
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(assignee) = self.assigned_personnel_id {
            next.assigned_personnel_id = non_blank(Some(assignee));
        }
        if self.notes.is_some() {
            next.notes = non_blank(self.notes);
        }
        if self.process_point.is_some() {
            next.process_point = self.process_point;
        }
        if let Some(start_time) = self.start_time {
            next.start_time = start_time;
        }
        if let Some(flag) = self.quick_turn {
            next.quick_turn = flag;
        }
        if self.deadline.is_some() {
            next.deadline = non_blank(self.deadline);
        }

        *shot = next;
        Ok(outcome)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn at() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    fn shot() -> ShotRequest {
        NewShotRequest {
            event_id: "evt1".into(),
            title: None,
            description: "Wide shot of stage".into(),
            priority: None,
            status: None,
            assigned_personnel_id: None,
            notes: None,
            blocked_reason: None,
            process_point: None,
            start_time: None,
            quick_turn: false,
            deadline: None,
            actor_id: None,
        }
        .into_shot("s1".into(), at())
        .unwrap()
    }

    fn change(status: ShotStatus, actor: &str) -> StatusChange<'_> {
        StatusChange {
            status,
            actor_id: actor,
            blocked_reason: None,
            at: at(),
        }
    }

    fn assert_consistent(shot: &ShotRequest) {
        assert_eq!(shot.status == ShotStatus::Blocked, !shot.blocked_reason.is_empty());
        if shot.status.is_captured() {
            assert!(shot.initial_capturer_id.is_some());
        } else {
            assert!(shot.initial_capturer_id.is_none());
        }
    }

    #[test]
    fn new_shot_defaults() {
        let shot = shot();
        assert_eq!(shot.priority, Priority::Medium);
        assert_eq!(shot.status, ShotStatus::Unassigned);
        assert!(shot.last_status_modifier_id.is_none());
    }

    #[test]
    fn short_description_is_rejected() {
        let mut new: NewShotRequest = serde_json::from_value(serde_json::json!({
            "eventId": "evt1",
            "description": "ab",
        }))
        .unwrap();
        assert_matches!(new.clone().into_shot("s".into(), at()), Err(CoreError::Validation(_)));
        new.description = "abc".into();
        assert!(new.into_shot("s".into(), at()).is_ok());
    }

    #[test]
    fn capture_records_first_capturer_only() {
        let mut shot = shot();
        shot.transition(change(ShotStatus::Captured, "p1")).unwrap();
        assert_eq!(shot.initial_capturer_id.as_deref(), Some("p1"));

        shot.transition(change(ShotStatus::Completed, "p2")).unwrap();
        assert_eq!(shot.initial_capturer_id.as_deref(), Some("p1"));
        assert_eq!(shot.last_status_modifier_id.as_deref(), Some("p2"));
        assert_consistent(&shot);
    }

    #[test]
    fn leaving_captured_clears_capturer() {
        let mut shot = shot();
        shot.transition(change(ShotStatus::Captured, "p1")).unwrap();
        shot.transition(change(ShotStatus::Assigned, "p2")).unwrap();
        assert!(shot.initial_capturer_id.is_none());
        assert_consistent(&shot);
    }

    #[test]
    fn blocked_requires_reason() {
        let mut shot = shot();
        let before = shot.clone();
        let err = shot.transition(change(ShotStatus::Blocked, "p1")).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
        assert_eq!(shot, before);

        let mut blocked = change(ShotStatus::Blocked, "p1");
        blocked.blocked_reason = Some("   ");
        assert!(shot.transition(blocked).is_err());

        blocked.blocked_reason = Some("Stage access denied");
        shot.transition(blocked).unwrap();
        assert_eq!(shot.blocked_reason, "Stage access denied");
        assert_consistent(&shot);
    }

    #[test]
    fn unblocking_clears_reason() {
        let mut shot = shot();
        let mut blocked = change(ShotStatus::Blocked, "p1");
        blocked.blocked_reason = Some("Rain");
        shot.transition(blocked).unwrap();
        shot.transition(change(ShotStatus::Assigned, "p1")).unwrap();
        assert_eq!(shot.blocked_reason, "");
        assert_consistent(&shot);
    }

    #[test]
    fn status_change_needs_actor() {
        let mut shot = shot();
        assert_matches!(
            shot.transition(change(ShotStatus::Captured, " ")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn every_transition_keeps_side_effects_consistent() {
        for from in ShotStatus::ALL {
            for to in ShotStatus::ALL {
                let mut shot = shot();
                let mut first = change(from, "p1");
                first.blocked_reason = Some("reason");
                shot.transition(first).unwrap();
                let mut second = change(to, "p2");
                second.blocked_reason = Some("reason");
                shot.transition(second).unwrap();
                assert_consistent(&shot);
                assert_eq!(shot.last_status_modifier_id.as_deref(), Some("p2"));
            }
        }
    }

    #[test]
    fn request_more_is_reported_once() {
        let mut shot = shot();
        let outcome = shot.transition(change(ShotStatus::RequestMore, "p1")).unwrap();
        assert!(outcome.requested_more());
        let outcome = shot.transition(change(ShotStatus::RequestMore, "p1")).unwrap();
        assert!(!outcome.requested_more());
    }

    #[test]
    fn update_clears_empty_assignee() {
        let mut shot = shot();
        shot.assigned_personnel_id = Some("p1".into());
        let update = ShotRequestUpdate {
            assigned_personnel_id: Some(String::new()),
            ..Default::default()
        };
        assert!(update.apply(&mut shot, at()).unwrap().is_none());
        assert!(shot.assigned_personnel_id.is_none());
    }

    #[test]
    fn update_sets_keeps_and_clears_start_time() {
        let mut shot = shot();
        let set: ShotRequestUpdate =
            serde_json::from_value(serde_json::json!({ "startTime": "10:30" })).unwrap();
        set.apply(&mut shot, at()).unwrap();
        assert_eq!(shot.start_time, NaiveTime::from_hms_opt(10, 30, 0));

        let other: ShotRequestUpdate =
            serde_json::from_value(serde_json::json!({ "notes": "Use the long lens" })).unwrap();
        other.apply(&mut shot, at()).unwrap();
        assert_eq!(shot.start_time, NaiveTime::from_hms_opt(10, 30, 0));

        let cleared: ShotRequestUpdate =
            serde_json::from_value(serde_json::json!({ "startTime": "" })).unwrap();
        cleared.apply(&mut shot, at()).unwrap();
        assert_eq!(shot.start_time, None);
    }

    #[test]
    fn rejected_update_changes_nothing() {
        let mut shot = shot();
        let before = shot.clone();
        let update = ShotRequestUpdate {
            notes: Some("new notes".into()),
            status: Some(ShotStatus::Blocked),
            actor_id: Some("p1".into()),
            ..Default::default()
        };
        assert!(update.apply(&mut shot, at()).is_err());
        assert_eq!(shot, before);
    }

    #[test]
    fn update_keeps_existing_block_reason() {
        let mut shot = shot();
        let mut blocked = change(ShotStatus::Blocked, "p1");
        blocked.blocked_reason = Some("No access");
        shot.transition(blocked).unwrap();

        let update = ShotRequestUpdate {
            status: Some(ShotStatus::Blocked),
            actor_id: Some("p2".into()),
            ..Default::default()
        };
        update.apply(&mut shot, at()).unwrap();
        assert_eq!(shot.blocked_reason, "No access");
    }

    #[test]
    fn effective_stage_falls_back_to_event() {
        let mut shot = shot();
        assert_eq!(shot.effective_process_point(ProcessPoint::Cull), ProcessPoint::Cull);
        shot.process_point = Some(ProcessPoint::Ingest);
        assert_eq!(shot.effective_process_point(ProcessPoint::Cull), ProcessPoint::Ingest);
    }

    #[test]
    fn progress_counts_captured_and_completed() {
        let mut a = shot();
        let mut b = shot();
        let c = shot();
        a.transition(change(ShotStatus::Captured, "p1")).unwrap();
        b.transition(change(ShotStatus::Completed, "p1")).unwrap();
        assert_eq!(shot_progress([&a, &b, &c]), ShotProgress { captured: 2, total: 3 });
    }

    #[test]
    fn status_serializes_with_display_label() {
        assert_eq!(
            serde_json::to_string(&ShotStatus::RequestMore).unwrap(),
            "\"Request More\""
        );
    }
}
