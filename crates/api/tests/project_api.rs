//! Integration tests for project statistics and shot planner views.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_event, get, post_json, put_json};
use serde_json::json;

struct Fixture {
    app: axum::Router,
    morning: String,
}

/// Two events on 2024-07-15: "Morning" (09:00-10:00, delivered) and
/// "Keynote" (14:00-15:00) with three shots.
async fn fixture() -> Fixture {
    let (app, _) = common::build_test_app();
    let keynote = create_event(
        &app,
        json!({
            "name": "Keynote",
            "projectId": "proj1",
            "date": "2024-07-15",
            "startTime": "14:00",
            "endTime": "15:00",
            "assignedPersonnelIds": ["p1", "p2"],
        }),
    )
    .await;
    let morning = create_event(
        &app,
        json!({
            "name": "Morning",
            "projectId": "proj1",
            "date": "2024-07-15",
            "startTime": "09:00",
            "endTime": "10:00",
            "processPoint": "Delivered",
            "assignedPersonnelIds": ["p2", "p3"],
        }),
    )
    .await;

    for shot in [
        json!({ "eventId": keynote, "description": "Speaker close-up", "quickTurn": true, "startTime": "14:30", "processPoint": "Color" }),
        json!({ "eventId": keynote, "description": "Sponsor wall", "deadline": "2024-07-16" }),
        json!({ "eventId": keynote, "description": "Walk-on", "startTime": "14:10" }),
        json!({ "eventId": morning, "description": "Breakfast room" }),
    ] {
        let response = post_json(app.clone(), "/shot-requests", shot).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    Fixture { app, morning }
}

fn descriptions(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["description"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Test: GET /projects/{id}/statistics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn statistics_summarise_project() {
    let f = fixture().await;

    let response = get(
        f.app.clone(),
        "/projects/proj1/statistics?now=2024-07-15T12:00:00Z",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = &body_json(response).await["data"];

    assert_eq!(stats["totalEvents"], 2);
    assert_eq!(stats["totalShotRequests"], 4);
    assert_eq!(stats["eventStatusCounts"]["Scheduled"], 1);
    assert_eq!(stats["eventStatusCounts"]["Done"], 1);
    assert_eq!(stats["eventProcessPointCounts"]["Idle"], 1);
    assert_eq!(stats["eventProcessPointCounts"]["Delivered"], 1);
    assert_eq!(stats["eventProcessPointCounts"]["Ingest"], 0);
    assert_eq!(stats["completedEvents"], 1);
    assert_eq!(stats["completionPercentage"], 50);
    // The morning event is done, so only the keynote's crew counts.
    assert_eq!(stats["mostAssigned"]["personnelId"], "p1");
    assert_eq!(stats["mostAssigned"]["assignments"], 1);
}

#[tokio::test]
async fn statistics_for_empty_project() {
    let (app, _) = common::build_test_app();

    let stats = &body_json(get(app, "/projects/none/statistics").await).await["data"];
    assert_eq!(stats["totalEvents"], 0);
    assert_eq!(stats["completionPercentage"], 0);
    assert!(stats.get("mostAssigned").is_none());
}

#[tokio::test]
async fn statistics_follow_process_point_updates() {
    let f = fixture().await;
    put_json(
        f.app.clone(),
        &format!("/events/{}", f.morning),
        json!({ "processPoint": "Cull" }),
    )
    .await;

    let stats = &body_json(get(f.app, "/projects/proj1/statistics").await).await["data"];
    assert_eq!(stats["completedEvents"], 0);
    assert_eq!(stats["eventProcessPointCounts"]["Cull"], 1);
}

// ---------------------------------------------------------------------------
// Test: GET /projects/{id}/shots filtering and ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shot_list_orders_timed_shots_first() {
    let f = fixture().await;

    let json = body_json(get(f.app, "/projects/proj1/shots").await).await;
    assert_eq!(
        descriptions(&json),
        ["Speaker close-up", "Walk-on", "Sponsor wall", "Breakfast room"]
    );
}

#[tokio::test]
async fn shot_list_filters() {
    let f = fixture().await;

    let json = body_json(get(f.app.clone(), "/projects/proj1/shots?quickTurn=true").await).await;
    assert_eq!(descriptions(&json), ["Speaker close-up"]);

    // Shots without a stage of their own inherit their event's.
    let json = body_json(get(f.app.clone(), "/projects/proj1/shots?processPoint=idle").await).await;
    assert_eq!(descriptions(&json), ["Walk-on", "Sponsor wall"]);

    let json = body_json(get(f.app.clone(), "/projects/proj1/shots?processPoint=Delivered").await).await;
    assert_eq!(descriptions(&json), ["Breakfast room"]);

    let json = body_json(get(f.app.clone(), "/projects/proj1/shots?date=2024-07-14").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let response = get(f.app, "/projects/proj1/shots?processPoint=archive").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: upcoming and delivered views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upcoming_shots_within_next_day() {
    let f = fixture().await;

    let json = body_json(
        get(f.app.clone(), "/projects/proj1/shots/upcoming?now=2024-07-15T12:00:00Z").await,
    )
    .await;
    let mut upcoming = descriptions(&json);
    upcoming.sort();
    assert_eq!(upcoming, ["Speaker close-up", "Sponsor wall", "Walk-on"]);

    let json = body_json(
        get(f.app, "/projects/proj1/shots/upcoming?now=2024-07-15T14:20:00Z").await,
    )
    .await;
    assert_eq!(descriptions(&json), ["Speaker close-up"]);
}

#[tokio::test]
async fn delivered_shots_come_from_delivered_events() {
    let f = fixture().await;

    let json = body_json(get(f.app, "/projects/proj1/shots/delivered").await).await;
    assert_eq!(descriptions(&json), ["Breakfast room"]);
}
