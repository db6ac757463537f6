//! Route definitions for the ingestion job ledger and reports.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ingestion;
use crate::state::AppState;

/// Ingestion routes, merged at the root.
///
/// ```text
/// GET  /ingest-jobs                 -> list_jobs
/// POST /ingest-jobs                 -> upsert_job
/// POST /ingest-jobs/reconcile       -> reconcile_jobs
/// POST /ingest-report               -> store_report
/// GET  /reports/ingest/{file}       -> get_report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/ingest-jobs",
            get(ingestion::list_jobs).post(ingestion::upsert_job),
        )
        .route("/ingest-jobs/reconcile", post(ingestion::reconcile_jobs))
        .route("/ingest-report", post(ingestion::store_report))
        .route("/reports/ingest/{file}", get(ingestion::get_report))
}
