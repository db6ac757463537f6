//! Handlers for the `/events` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, FixedOffset};
use hive_core::error::CoreError;
use hive_core::event::{Event, EventUpdate, NewEvent};
use hive_core::event_status::EventStatus;
use hive_core::shot_request::{shot_progress, ShotProgress};
use hive_events::EventKind;
use serde::{Deserialize, Serialize};

use super::NowQuery;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    pub project_id: Option<String>,
    /// Instant (with offset) to derive statuses at. Its offset is taken as
    /// the viewer's time zone. Defaults to the server's local time.
    pub now: Option<DateTime<FixedOffset>>,
}

/// An event together with its status at the requested instant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub current_status: EventStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelInput {
    pub personnel_id: String,
}

// ---------------------------------------------------------------------------
// List / get
// ---------------------------------------------------------------------------

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListQuery>,
) -> AppResult<impl IntoResponse> {
    let now = params.now.unwrap_or_else(|| state.local_now());
    let data = state.data.lock().await;
    let events: Vec<EventView> = data
        .production
        .events()
        .filter(|e| params.project_id.as_deref().is_none_or(|p| e.project_id == p))
        .map(|e| EventView {
            current_status: e.derived_status(&now),
            event: e.clone(),
        })
        .collect();

    Ok(Json(DataResponse { data: events }))
}

/// GET /events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<NowQuery>,
) -> AppResult<impl IntoResponse> {
    let now = params.now.unwrap_or_else(|| state.local_now());
    let data = state.data.lock().await;
    let event = data
        .production
        .event(&id)
        .ok_or_else(|| CoreError::not_found("event", id.as_str()))?;

    Ok(Json(DataResponse {
        data: EventView {
            current_status: event.derived_status(&now),
            event: event.clone(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Create / update / delete
// ---------------------------------------------------------------------------

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<NewEvent>,
) -> AppResult<impl IntoResponse> {
    let event = state.data.lock().await.production.create_event(input)?;

    tracing::info!(event_id = %event.id, project_id = %event.project_id, "Event created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// PUT /events/{id}
///
/// A `processPoint` in the body is normalised; moving backwards through the
/// pipeline is allowed and logged.
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<EventUpdate>,
) -> AppResult<impl IntoResponse> {
    let (event, change) = state.data.lock().await.production.update_event(&id, input)?;

    if let Some(change) = change {
        if change.is_regression() {
            tracing::info!(
                event_id = %event.id,
                from = %change.from,
                to = %change.to,
                "Event process point moved backwards",
            );
        }
        state.event_bus.publish(EventKind::EventStageChanged {
            event_id: event.id.clone(),
            from: change.from,
            to: change.to,
            regression: change.is_regression(),
        });
    }

    Ok(Json(DataResponse { data: event }))
}

/// DELETE /events/{id}
///
/// Also deletes every shot request of the event.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (event, shots) = state.data.lock().await.production.delete_event(&id)?;

    tracing::info!(event_id = %event.id, shots_removed = shots.len(), "Event deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Personnel activity
// ---------------------------------------------------------------------------

/// POST /events/{id}/check-in
pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PersonnelInput>,
) -> AppResult<impl IntoResponse> {
    let now = state.clock.now();
    let event = state
        .data
        .lock()
        .await
        .production
        .check_in(&id, &input.personnel_id, now)?;

    tracing::info!(event_id = %id, personnel_id = %input.personnel_id, "Checked in");

    Ok(Json(DataResponse { data: event }))
}

/// POST /events/{id}/check-out
///
/// A person who never checked in is left untouched.
pub async fn check_out(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PersonnelInput>,
) -> AppResult<impl IntoResponse> {
    let now = state.clock.now();
    let (event, changed) = state
        .data
        .lock()
        .await
        .production
        .check_out(&id, &input.personnel_id, now)?;

    if changed {
        tracing::info!(event_id = %id, personnel_id = %input.personnel_id, "Checked out");
    } else {
        tracing::debug!(event_id = %id, personnel_id = %input.personnel_id, "Check-out without check-in ignored");
    }

    Ok(Json(DataResponse { data: event }))
}

// ---------------------------------------------------------------------------
// Shots of an event
// ---------------------------------------------------------------------------

/// GET /events/{id}/shot-requests
pub async fn list_event_shots(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = state.data.lock().await;
    if data.production.event(&id).is_none() {
        return Err(CoreError::not_found("event", id.as_str()).into());
    }
    let shots = data.production.shots_for_event(&id).to_vec();

    Ok(Json(DataResponse { data: shots }))
}

/// GET /events/{id}/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = state.data.lock().await;
    if data.production.event(&id).is_none() {
        return Err(CoreError::not_found("event", id.as_str()).into());
    }
    let progress: ShotProgress = shot_progress(data.production.shots_for_event(&id));

    Ok(Json(DataResponse { data: progress }))
}
