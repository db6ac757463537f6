//! Project-level aggregates and shot planner views.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use indexmap::IndexMap;
use serde::Serialize;

use crate::event::Event;
use crate::event_status::{self, EventStatus};
use crate::process_point::ProcessPoint;
use crate::shot_request::ShotRequest;
use crate::store::ProductionStore;
use crate::types::EntityId;

/// Look-ahead window for upcoming shots.
pub const UPCOMING_SHOT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostAssigned {
    pub personnel_id: EntityId,
    pub assignments: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatistics {
    pub total_events: usize,
    pub total_shot_requests: usize,
    pub event_status_counts: IndexMap<String, usize>,
    /// Every stage is present, zero-filled, in pipeline order.
    pub event_process_point_counts: IndexMap<ProcessPoint, usize>,
    pub completed_events: usize,
    pub completion_percentage: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_assigned: Option<MostAssigned>,
}

pub fn project_statistics<Tz: TimeZone>(
    store: &ProductionStore,
    project_id: &str,
    now: &DateTime<Tz>,
) -> ProjectStatistics {
    let events: Vec<&Event> = store.events_for_project(project_id).collect();

    let mut event_status_counts: IndexMap<String, usize> = IndexMap::new();
    let mut event_process_point_counts: IndexMap<ProcessPoint, usize> =
        ProcessPoint::ALL.into_iter().map(|stage| (stage, 0)).collect();
    let mut total_shot_requests = 0;

    for event in &events {
        let status = event.derived_status(now);
        *event_status_counts.entry(status.to_string()).or_default() += 1;
        *event_process_point_counts.entry(event.process_point).or_default() += 1;
        total_shot_requests += store.shots_for_event(&event.id).len();
    }

    let completed_events = event_process_point_counts[&ProcessPoint::Delivered];
    let completion_percentage = if events.is_empty() {
        0
    } else {
        ((completed_events as f64 / events.len() as f64) * 100.0).round() as u32
    };

    ProjectStatistics {
        total_events: events.len(),
        total_shot_requests,
        event_status_counts,
        event_process_point_counts,
        completed_events,
        completion_percentage,
        most_assigned: most_assigned(&events, now),
    }
}

/// Person with the most assignments across events that are not done.
/// Ties keep the person encountered first.
fn most_assigned<Tz: TimeZone>(events: &[&Event], now: &DateTime<Tz>) -> Option<MostAssigned> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for event in events.iter().filter(|e| !e.is_done(now)) {
        for id in &event.assigned_personnel_ids {
            *counts.entry(id.as_str()).or_default() += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (id, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((id, count));
        }
    }
    best.map(|(id, assignments)| MostAssigned {
        personnel_id: id.to_string(),
        assignments,
    })
}

/* --------------------------------------------------------------------------
Shot planner views
-------------------------------------------------------------------------- */

/// Filters for the project shot list. `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct ShotFilter {
    pub quick_turn_only: bool,
    pub process_point: Option<ProcessPoint>,
    pub date: Option<NaiveDate>,
}

fn project_shots<'a>(
    store: &'a ProductionStore,
    project_id: &'a str,
) -> impl Iterator<Item = (&'a Event, &'a ShotRequest)> {
    store
        .events_for_project(project_id)
        .flat_map(move |event| store.shots_for_event(&event.id).iter().map(move |shot| (event, shot)))
}

/// Shots whose event has been delivered.
pub fn delivered_shots<'a>(store: &'a ProductionStore, project_id: &'a str) -> Vec<&'a ShotRequest> {
    project_shots(store, project_id)
        .filter(|(event, _)| event.process_point.is_complete())
        .map(|(_, shot)| shot)
        .collect()
}

/// Shots starting within the next 24 hours.
///
/// A shot starts at its own start time on the event's day, or with its
/// event when it has none.
pub fn upcoming_shots<'a, Tz: TimeZone>(
    store: &'a ProductionStore,
    project_id: &'a str,
    now: &DateTime<Tz>,
) -> Vec<&'a ShotRequest> {
    let horizon = now.clone() + Duration::hours(UPCOMING_SHOT_WINDOW_HOURS);
    let tz = now.timezone();
    project_shots(store, project_id)
        .filter(|(event, shot)| {
            let start = match shot.start_time {
                Some(time) => event_status::combine(&tz, event.date.and_time(time)),
                None => event.starts_at(&tz),
            };
            start.is_some_and(|start| start >= *now && start <= horizon)
        })
        .map(|(_, shot)| shot)
        .collect()
}

/// Filtered shot list, ordered with timed shots first (latest start
/// first), then by earliest deadline.
pub fn filter_shots<'a>(
    store: &'a ProductionStore,
    project_id: &'a str,
    filter: &ShotFilter,
) -> Vec<&'a ShotRequest> {
    let mut shots: Vec<&ShotRequest> = project_shots(store, project_id)
        .filter(|(_, shot)| !filter.quick_turn_only || shot.quick_turn)
        .filter(|(event, shot)| {
            filter
                .process_point
                .map_or(true, |stage| shot.effective_process_point(event.process_point) == stage)
        })
        .filter(|(event, _)| filter.date.map_or(true, |date| event.date == date))
        .map(|(_, shot)| shot)
        .collect();

    shots.sort_by(|a, b| match (a.start_time, b.start_time) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => match (&a.deadline, &b.deadline) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        },
    });
    shots
}

/// Label counts for a batch of events at `now`, in first-seen order.
pub fn status_counts<'a, Tz: TimeZone>(
    events: impl IntoIterator<Item = &'a Event>,
    now: &DateTime<Tz>,
) -> IndexMap<EventStatus, usize> {
    let mut counts = IndexMap::new();
    for event in events {
        *counts.entry(event.derived_status(now)).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventUpdate;
    use crate::shot_request::ShotRequestUpdate;
    use crate::store::tests::{at, new_event, new_shot};
    use chrono::{NaiveTime, Utc};

    fn seeded() -> (ProductionStore, Vec<EntityId>) {
        let mut store = ProductionStore::new();
        let mut ids = Vec::new();
        for (name, stage, people) in [
            ("Keynote", ProcessPoint::Delivered, vec!["alice", "bob"]),
            ("Panel", ProcessPoint::Cull, vec!["bob"]),
            ("Dinner", ProcessPoint::Idle, vec!["carol", "bob"]),
        ] {
            let mut new = new_event(name, "proj1");
            new.process_point = Some(stage);
            new.assigned_personnel_ids = people.into_iter().map(String::from).collect();
            ids.push(store.create_event(new).unwrap().id);
        }
        store.create_event(new_event("Other", "proj2")).unwrap();
        for id in &ids {
            store.create_shot(new_shot(id, "Crowd reaction"), at()).unwrap();
        }
        (store, ids)
    }

    #[test]
    fn statistics_count_stages_and_completion() {
        let (store, _) = seeded();
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 13, 50, 0).unwrap();
        let stats = project_statistics(&store, "proj1", &now);

        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.total_shot_requests, 3);
        assert_eq!(stats.event_status_counts["Starting Soon"], 3);
        assert_eq!(stats.event_process_point_counts.len(), 5);
        assert_eq!(stats.event_process_point_counts[&ProcessPoint::Ingest], 0);
        assert_eq!(stats.completed_events, 1);
        assert_eq!(stats.completion_percentage, 33);
        assert_eq!(
            stats.most_assigned,
            Some(MostAssigned {
                personnel_id: "bob".into(),
                assignments: 3
            })
        );
    }

    #[test]
    fn finished_events_do_not_count_towards_assignments() {
        let (store, _) = seeded();
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 18, 0, 0).unwrap();
        let stats = project_statistics(&store, "proj1", &now);
        assert_eq!(stats.most_assigned, None);
        assert_eq!(stats.event_status_counts["Done"], 3);
    }

    #[test]
    fn empty_project_has_zero_completion() {
        let store = ProductionStore::new();
        let stats = project_statistics(&store, "none", &Utc::now());
        assert_eq!(stats.completion_percentage, 0);
        assert!(stats.most_assigned.is_none());
    }

    #[test]
    fn delivered_shots_follow_event_stage() {
        let (store, ids) = seeded();
        let shots = delivered_shots(&store, "proj1");
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].event_id, ids[0]);
    }

    #[test]
    fn upcoming_shots_use_shot_time_then_event_time() {
        let (mut store, ids) = seeded();
        let timed = store.shots_for_event(&ids[1])[0].id.clone();
        store
            .update_shot(
                &timed,
                ShotRequestUpdate {
                    start_time: Some(NaiveTime::from_hms_opt(9, 0, 0)),
                    ..Default::default()
                },
                at(),
            )
            .unwrap();

        // 10:00: shots on the 14:00 events are upcoming, the 09:00 shot has passed.
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 10, 0, 0).unwrap();
        let upcoming = upcoming_shots(&store, "proj1", &now);
        assert_eq!(upcoming.len(), 2);
        assert!(upcoming.iter().all(|s| s.id != timed));
    }

    #[test]
    fn filter_uses_effective_stage() {
        let (mut store, ids) = seeded();
        let shot_id = store.shots_for_event(&ids[2])[0].id.clone();
        store
            .update_shot(
                &shot_id,
                ShotRequestUpdate {
                    process_point: Some(ProcessPoint::Cull),
                    quick_turn: Some(true),
                    ..Default::default()
                },
                at(),
            )
            .unwrap();

        let filter = ShotFilter {
            process_point: Some(ProcessPoint::Cull),
            ..Default::default()
        };
        assert_eq!(filter_shots(&store, "proj1", &filter).len(), 2);

        let filter = ShotFilter {
            quick_turn_only: true,
            ..Default::default()
        };
        let shots = filter_shots(&store, "proj1", &filter);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].id, shot_id);
    }

    #[test]
    fn stage_updates_shift_counts() {
        let (mut store, ids) = seeded();
        store
            .update_event(
                &ids[1],
                EventUpdate {
                    process_point: Some(ProcessPoint::Delivered),
                    ..Default::default()
                },
            )
            .unwrap();
        let stats = project_statistics(&store, "proj1", &Utc::now());
        assert_eq!(stats.completion_percentage, 67);
    }
}
