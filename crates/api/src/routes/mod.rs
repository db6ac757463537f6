pub mod events;
pub mod health;
pub mod ingestion;
pub mod notifications;
pub mod projects;
pub mod shot_requests;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree. Everything is mounted at the root, next to
/// `/health`, where the dashboard and the ingest agent expect it.
///
/// Route hierarchy:
///
/// ```text
/// /events                                 list, create
/// /events/{id}                            get, update, delete
/// /events/{id}/check-in                   check a person in (POST)
/// /events/{id}/check-out                  check a person out (POST)
/// /events/{id}/shot-requests              shots of one event
/// /events/{id}/progress                   captured / total
///
/// /shot-requests                          list, create
/// /shot-requests/{id}                     get, update, delete
///
/// /ingest-jobs                            list, upsert agent report
/// /ingest-jobs/reconcile                  run a reconciliation pass (POST)
/// /ingest-report                          store an ingestion report (POST)
/// /reports/ingest/{jobId}.json            fetch a stored report
///
/// /projects/{id}/statistics               dashboard statistics
/// /projects/{id}/shots                    filtered shot list
/// /projects/{id}/shots/upcoming           shots starting in the next 24 h
/// /projects/{id}/shots/delivered          shots of delivered events
///
/// /notifications                          list, create
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/events", events::router())
        .nest("/shot-requests", shot_requests::router())
        .nest("/projects", projects::router())
        .nest("/notifications", notifications::router())
        .merge(ingestion::router())
}
