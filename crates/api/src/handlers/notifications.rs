//! Handlers for the notification inbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hive_core::error::CoreError;
use hive_core::types::EntityId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::notifications::Notification;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub recipient_id: Option<String>,
}

/// A notification sent by the ingest agent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: EntityId,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub job_id: Option<EntityId>,
}

/// GET /notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<impl IntoResponse> {
    let entries = match params.recipient_id.as_deref() {
        Some(recipient) => state.inbox.for_recipient(recipient).await,
        None => state.inbox.all().await,
    };
    Ok(Json(DataResponse { data: entries }))
}

/// POST /notifications
pub async fn create_notification(
    State(state): State<AppState>,
    Json(input): Json<NewNotification>,
) -> AppResult<impl IntoResponse> {
    if input.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("userId must not be empty".into()));
    }
    if input.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".into()));
    }

    let mut notification = Notification::new(input.user_id, input.kind, input.message);
    notification.job_id = input.job_id;
    notification.created_at = state.clock.now();

    tracing::info!(
        recipient_id = %notification.recipient_id,
        kind = %notification.kind,
        job_id = ?notification.job_id,
        "Agent notification received",
    );
    state.inbox.push(notification.clone()).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: notification })))
}

/// DELETE /notifications/{id}
pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !state.inbox.dismiss(&id).await {
        return Err(CoreError::not_found("notification", id.as_str()).into());
    }

    tracing::info!(notification_id = %id, "Notification dismissed");

    Ok(StatusCode::NO_CONTENT)
}
