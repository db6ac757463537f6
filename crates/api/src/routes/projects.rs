//! Route definitions for project statistics and shot views.

use axum::routing::get;
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Project routes mounted at `/projects`.
///
/// ```text
/// GET /{id}/statistics         -> get_statistics (?now)
/// GET /{id}/shots              -> filter_shots (?quickTurn, ?processPoint, ?date)
/// GET /{id}/shots/upcoming     -> upcoming_shots (?now)
/// GET /{id}/shots/delivered    -> delivered_shots
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/statistics", get(projects::get_statistics))
        .route("/{id}/shots", get(projects::filter_shots))
        .route("/{id}/shots/upcoming", get(projects::upcoming_shots))
        .route("/{id}/shots/delivered", get(projects::delivered_shots))
}
