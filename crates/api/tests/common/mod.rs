#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use hive_api::config::ServerConfig;
use hive_api::router::build_app_router;
use hive_api::state::AppState;
use hive_core::clock::{Clock, ManualClock};
use hive_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
///
/// Background reconciliation is disabled; tests trigger passes explicitly.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        reconcile_interval_secs: 0,
    }
}

/// A state whose clock is pinned to 2024-07-15 12:00 UTC.
pub fn test_state() -> (AppState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap(),
    ));
    let shared: Arc<dyn Clock> = clock.clone();
    let state = AppState::with_clock(test_config(), Arc::new(EventBus::default()), shared);
    (state, clock)
}

/// Build the full application router with the production middleware stack.
///
/// The returned state shares its data with the router, so tests can inspect
/// or seed it directly.
pub fn build_test_app() -> (Router, AppState) {
    let (state, _) = test_state();
    let app = build_app_router(state.clone(), &test_config());
    (app, state)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an event through the API and return its id.
pub async fn create_event(app: &Router, body: serde_json::Value) -> String {
    let response = post_json(app.clone(), "/events", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Create a shot request through the API and return its id.
pub async fn create_shot(app: &Router, event_id: &str, description: &str) -> String {
    let response = post_json(
        app.clone(),
        "/shot-requests",
        serde_json::json!({ "eventId": event_id, "description": description }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}
