//! Handlers for the ingestion job ledger and ingestion reports.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hive_core::error::CoreError;
use hive_core::ingestion::IngestionJobReport;
use hive_core::report::{report_url, IngestionReport};
use hive_core::types::EntityId;
use serde::{Deserialize, Serialize};

use crate::background::reconcile::reconcile_once;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Job ledger
// ---------------------------------------------------------------------------

/// GET /ingest-jobs
pub async fn list_jobs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let jobs: Vec<_> = state.data.lock().await.jobs.values().cloned().collect();
    Ok(Json(DataResponse { data: jobs }))
}

/// POST /ingest-jobs
///
/// Upserts by `jobId`. Fields absent from the report keep their value.
pub async fn upsert_job(
    State(state): State<AppState>,
    Json(report): Json<IngestionJobReport>,
) -> AppResult<impl IntoResponse> {
    report.validate()?;
    let now = state.clock.now();

    let mut data = state.data.lock().await;
    let (job, created) = match data.jobs.get_mut(&report.job_id) {
        Some(job) => {
            report.merge_into(job, now);
            (job.clone(), false)
        }
        None => {
            let job = report.into_job(now)?;
            data.jobs.insert(job.job_id.clone(), job.clone());
            (job, true)
        }
    };
    drop(data);

    tracing::debug!(job_id = %job.job_id, status = ?job.status, created, "Ingestion job reported");

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(DataResponse { data: job })))
}

/// POST /ingest-jobs/reconcile
pub async fn reconcile_jobs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let outcome = reconcile_once(&state).await;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportUpload {
    pub job_id: EntityId,
    pub user_id: Option<EntityId>,
    pub report: IngestionReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStored {
    pub report_url: String,
}

/// POST /ingest-report
///
/// Stores the report and records its URL on the job, if the job is known.
pub async fn store_report(
    State(state): State<AppState>,
    Json(upload): Json<ReportUpload>,
) -> AppResult<impl IntoResponse> {
    if upload.job_id.trim().is_empty() {
        return Err(AppError::BadRequest("jobId must not be empty".into()));
    }
    let url = report_url(&upload.job_id);

    let mut data = state.data.lock().await;
    if let Some(job) = data.jobs.get_mut(&upload.job_id) {
        job.report_url = Some(url.clone());
    }
    data.reports.insert(upload.job_id.clone(), upload.report);
    drop(data);

    tracing::info!(job_id = %upload.job_id, user_id = ?upload.user_id, "Ingestion report stored");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ReportStored { report_url: url },
        }),
    ))
}

/// GET /reports/ingest/{file}
///
/// `file` is `{jobId}.json`. The report is returned bare, as the agent
/// uploaded it.
pub async fn get_report(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job_id = file.strip_suffix(".json").unwrap_or(&file);
    let report = state
        .data
        .lock()
        .await
        .reports
        .get(job_id)
        .cloned()
        .ok_or_else(|| CoreError::not_found("ingestion report", job_id))?;

    Ok(Json(report))
}
