//! HTTP surface of the Hive backend.
//!
//! [`build_app_router`] is used by `main.rs` and by the integration tests,
//! so both exercise the same layers in front of the handlers.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Correlates a dashboard or monitor call with the backend's log lines.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// How long browsers may cache a preflight answer.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(3600);

/// Assemble the routes and their layers.
///
/// Outermost first, a request passes through:
///
/// | Layer | Effect |
/// |-------|--------|
/// | CORS | answers dashboard preflights |
/// | set request id | keeps a caller's `x-request-id` or mints a UUID |
/// | trace | one INFO span per request, tagged with the id |
/// | propagate request id | echoes the id on the response |
/// | timeout | 408 once `REQUEST_TIMEOUT_SECS` elapse |
/// | catch panic | a panicking handler becomes a 500 |
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(request_trace_layer())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

fn request_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// CORS for the dashboard origins in `CORS_ORIGINS`.
///
/// The backend has no sessions, so credentials are not allowed. The
/// request id is exposed so the dashboard can quote it in bug reports.
///
/// # Panics
///
/// On an origin that is not a valid header value. This only runs at
/// startup.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id])
        .max_age(PREFLIGHT_MAX_AGE)
}
