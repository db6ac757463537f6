//! Live event status board.
//!
//! Holds the last derived status of every watched event. On each status
//! tick the board re-derives all statuses at the given instant and reports
//! (and logs) the ones that changed.

use chrono::{DateTime, TimeZone};
use hive_core::event::Event;
use hive_core::event_status::EventStatus;
use hive_core::types::EntityId;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEntry {
    pub name: String,
    pub status: EventStatus,
}

/// A status that differs from the previous tick. `from` is `None` for an
/// event seen for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    pub event_id: EntityId,
    pub name: String,
    pub from: Option<EventStatus>,
    pub to: EventStatus,
}

#[derive(Debug, Default)]
pub struct StatusBoard {
    entries: IndexMap<EntityId, BoardEntry>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the board with `events` evaluated at `now`.
    ///
    /// Events missing from `events` are dropped from the board.
    pub fn refresh<Tz: TimeZone>(
        &mut self,
        events: &[Event],
        now: &DateTime<Tz>,
    ) -> Vec<StatusTransition> {
        let mut next = IndexMap::with_capacity(events.len());
        let mut transitions = Vec::new();

        for event in events {
            let status = event.derived_status(now);
            let previous = self.entries.get(&event.id).map(|e| e.status.clone());
            if previous.as_ref() != Some(&status) {
                match &previous {
                    Some(from) => tracing::info!(
                        event_id = %event.id,
                        name = %event.name,
                        from = %from,
                        to = %status,
                        "Event status changed",
                    ),
                    None => tracing::debug!(event_id = %event.id, status = %status, "Event added to board"),
                }
                transitions.push(StatusTransition {
                    event_id: event.id.clone(),
                    name: event.name.clone(),
                    from: previous,
                    to: status.clone(),
                });
            }
            next.insert(
                event.id.clone(),
                BoardEntry {
                    name: event.name.clone(),
                    status,
                },
            );
        }

        let removed = self.entries.keys().filter(|id| !next.contains_key(*id)).count();
        if removed > 0 {
            tracing::debug!(removed, "Events dropped from board");
        }

        self.entries = next;
        transitions
    }

    pub fn status(&self, event_id: &str) -> Option<&EventStatus> {
        self.entries.get(event_id).map(|e| &e.status)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&EntityId, &BoardEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, Utc};
    use hive_core::event::NewEvent;

    use super::*;

    fn event(id: &str, start: (u32, u32), end: (u32, u32)) -> Event {
        NewEvent {
            name: format!("Event {id}"),
            project_id: "proj1".into(),
            organization_id: None,
            date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0),
            location: None,
            description: None,
            status: None,
            process_point: None,
            is_quick_turnaround: false,
            deadline: None,
            assigned_personnel_ids: vec![],
            is_covered: None,
            discipline: None,
        }
        .into_event(id.into())
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, h, m, 0).unwrap()
    }

    #[test]
    fn first_refresh_reports_every_event() {
        let mut board = StatusBoard::new();
        let events = [event("a", (14, 0), (15, 0)), event("b", (9, 0), (10, 0))];

        let transitions = board.refresh(&events, &at(13, 50));

        assert_eq!(transitions.len(), 2);
        assert!(transitions.iter().all(|t| t.from.is_none()));
        assert_eq!(board.status("a"), Some(&EventStatus::StartingSoon));
        assert_eq!(board.status("b"), Some(&EventStatus::Done));
    }

    #[test]
    fn only_changes_are_reported_on_later_ticks() {
        let mut board = StatusBoard::new();
        let events = [event("a", (14, 0), (15, 0)), event("b", (9, 0), (10, 0))];
        board.refresh(&events, &at(13, 50));

        assert!(board.refresh(&events, &at(13, 55)).is_empty());

        let transitions = board.refresh(&events, &at(14, 0));
        assert_eq!(
            transitions,
            vec![StatusTransition {
                event_id: "a".into(),
                name: "Event a".into(),
                from: Some(EventStatus::StartingSoon),
                to: EventStatus::Ongoing,
            }]
        );
    }

    #[test]
    fn deleted_events_leave_the_board() {
        let mut board = StatusBoard::new();
        board.refresh(
            &[event("a", (14, 0), (15, 0)), event("b", (9, 0), (10, 0))],
            &at(12, 0),
        );

        board.refresh(&[event("a", (14, 0), (15, 0))], &at(12, 1));

        assert_eq!(board.len(), 1);
        assert!(board.status("b").is_none());
    }
}
