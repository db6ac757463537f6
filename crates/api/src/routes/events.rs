//! Route definitions for events and their personnel activity.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Event routes mounted at `/events`.
///
/// ```text
/// GET    /                      -> list_events (?projectId, ?now)
/// POST   /                      -> create_event
/// GET    /{id}                  -> get_event (?now)
/// PUT    /{id}                  -> update_event
/// DELETE /{id}                  -> delete_event
/// POST   /{id}/check-in         -> check_in
/// POST   /{id}/check-out        -> check_out
/// GET    /{id}/shot-requests    -> list_event_shots
/// GET    /{id}/progress         -> get_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/{id}/check-in", post(events::check_in))
        .route("/{id}/check-out", post(events::check_out))
        .route("/{id}/shot-requests", get(events::list_event_shots))
        .route("/{id}/progress", get(events::get_progress))
}
