//! Handlers for the `/shot-requests` resource.
//!
//! Status changes go through the core state machine; every applied change
//! is published on the event bus, and entering `Request More` additionally
//! publishes [`EventKind::ShotMoreRequested`] for the notification router.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hive_core::error::CoreError;
use hive_core::shot_request::{NewShotRequest, ShotRequestUpdate};
use hive_core::store::ShotMutation;
use hive_events::EventKind;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotListQuery {
    pub event_id: Option<String>,
}

/// GET /shot-requests
pub async fn list_shots(
    State(state): State<AppState>,
    Query(params): Query<ShotListQuery>,
) -> AppResult<impl IntoResponse> {
    let data = state.data.lock().await;
    let shots: Vec<_> = match params.event_id.as_deref() {
        Some(event_id) => data.production.shots_for_event(event_id).to_vec(),
        None => data.production.shots().cloned().collect(),
    };

    Ok(Json(DataResponse { data: shots }))
}

/// GET /shot-requests/{id}
pub async fn get_shot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = state.data.lock().await;
    let shot = data
        .production
        .shot(&id)
        .cloned()
        .ok_or_else(|| CoreError::not_found("shot request", id.as_str()))?;

    Ok(Json(DataResponse { data: shot }))
}

/// POST /shot-requests
pub async fn create_shot(
    State(state): State<AppState>,
    Json(input): Json<NewShotRequest>,
) -> AppResult<impl IntoResponse> {
    let actor_id = input.actor_id.clone();
    let mutation = state
        .data
        .lock()
        .await
        .production
        .create_shot(input, state.clock.now())?;

    tracing::info!(
        shot_id = %mutation.shot.id,
        event_id = %mutation.shot.event_id,
        status = %mutation.shot.status,
        "Shot request created",
    );
    publish_mutation(&state, &mutation, actor_id);

    Ok((StatusCode::CREATED, Json(DataResponse { data: mutation.shot })))
}

/// PUT /shot-requests/{id}
///
/// A `status` in the body requires a non-blank `actorId`.
pub async fn update_shot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ShotRequestUpdate>,
) -> AppResult<impl IntoResponse> {
    let actor_id = input.actor_id.clone();
    let mutation = state
        .data
        .lock()
        .await
        .production
        .update_shot(&id, input, state.clock.now())?;

    if let Some(transition) = mutation.transition {
        tracing::info!(
            shot_id = %mutation.shot.id,
            from = %transition.previous,
            to = %transition.current,
            actor_id = ?actor_id,
            "Shot status changed",
        );
        state.event_bus.publish(EventKind::ShotStatusChanged {
            shot_id: mutation.shot.id.clone(),
            event_id: mutation.shot.event_id.clone(),
            from: transition.previous,
            to: transition.current,
            actor_id: actor_id.clone(),
        });
    }
    publish_mutation(&state, &mutation, actor_id);

    Ok(Json(DataResponse { data: mutation.shot }))
}

/// DELETE /shot-requests/{id}
pub async fn delete_shot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let shot = state.data.lock().await.production.delete_shot(&id)?;

    tracing::info!(shot_id = %shot.id, event_id = %shot.event_id, "Shot request deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn publish_mutation(state: &AppState, mutation: &ShotMutation, requested_by: Option<String>) {
    let Some(more) = &mutation.more_requested else {
        return;
    };
    state.event_bus.publish(EventKind::ShotMoreRequested {
        shot_id: more.shot_id.clone(),
        event_id: more.event_id.clone(),
        recipient_id: more.recipient_id.clone(),
        description: more.description.clone(),
        requested_by,
    });
}
