//! Project-level read models: statistics and shot planner views.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use hive_core::process_point::ProcessPoint;
use hive_core::shot_request::ShotRequest;
use hive_core::statistics::{self, ShotFilter};
use serde::Deserialize;

use super::NowQuery;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotFilterQuery {
    #[serde(default)]
    pub quick_turn: bool,
    pub process_point: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ShotFilterQuery {
    fn into_filter(self) -> AppResult<ShotFilter> {
        let process_point = match self.process_point.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(ProcessPoint::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!("Unknown process point '{raw}'"))
            })?),
        };
        Ok(ShotFilter {
            quick_turn_only: self.quick_turn,
            process_point,
            date: self.date,
        })
    }
}

/// GET /projects/{id}/statistics
pub async fn get_statistics(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(params): Query<NowQuery>,
) -> AppResult<impl IntoResponse> {
    let now = params.now.unwrap_or_else(|| state.local_now());
    let data = state.data.lock().await;
    let stats = statistics::project_statistics(&data.production, &project_id, &now);

    Ok(Json(DataResponse { data: stats }))
}

/// GET /projects/{id}/shots
pub async fn filter_shots(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(params): Query<ShotFilterQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = params.into_filter()?;
    let data = state.data.lock().await;
    let shots = owned(statistics::filter_shots(&data.production, &project_id, &filter));

    Ok(Json(DataResponse { data: shots }))
}

/// GET /projects/{id}/shots/upcoming
pub async fn upcoming_shots(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(params): Query<NowQuery>,
) -> AppResult<impl IntoResponse> {
    let now = params.now.unwrap_or_else(|| state.local_now());
    let data = state.data.lock().await;
    let shots = owned(statistics::upcoming_shots(&data.production, &project_id, &now));

    Ok(Json(DataResponse { data: shots }))
}

/// GET /projects/{id}/shots/delivered
pub async fn delivered_shots(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let data = state.data.lock().await;
    let shots = owned(statistics::delivered_shots(&data.production, &project_id));

    Ok(Json(DataResponse { data: shots }))
}

fn owned(shots: Vec<&ShotRequest>) -> Vec<ShotRequest> {
    shots.into_iter().cloned().collect()
}
