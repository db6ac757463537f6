use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// Notification routes mounted at `/notifications`.
///
/// ```text
/// GET  /    -> list_notifications (?recipientId)
/// POST /    -> create_notification
/// DELETE /{id} -> dismiss_notification
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route("/{id}", delete(notifications::dismiss_notification))
}
