use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hive_core::error::CoreError;
use serde::Serialize;

/// Error returned by every handler.
///
/// Domain failures arrive as [`CoreError`]; request-shape problems the
/// domain never sees (bad query values, blank ids) use the HTTP variants.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Wire shape: `{ "error": "...", "code": "NOT_FOUND" }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl AppError {
    /// Status, machine code and client-facing message.
    ///
    /// Internal details are logged here and replaced by a generic message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            Self::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            Self::Core(CoreError::Conflict(msg)) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            Self::Core(CoreError::Internal(detail)) | Self::InternalError(detail) => {
                tracing::error!(error = %detail, "Request failed with an internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.parts();
        (status, Json(ErrorBody { error, code })).into_response()
    }
}
