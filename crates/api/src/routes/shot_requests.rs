//! Route definitions for shot requests.

use axum::routing::get;
use axum::Router;

use crate::handlers::shot_requests;
use crate::state::AppState;

/// Shot request routes mounted at `/shot-requests`.
///
/// ```text
/// GET    /        -> list_shots (?eventId)
/// POST   /        -> create_shot
/// GET    /{id}    -> get_shot
/// PUT    /{id}    -> update_shot
/// DELETE /{id}    -> delete_shot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(shot_requests::list_shots).post(shot_requests::create_shot),
        )
        .route(
            "/{id}",
            get(shot_requests::get_shot)
                .put(shot_requests::update_shot)
                .delete(shot_requests::delete_shot),
        )
}
