#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::json;
use tokio::net::TcpListener;

use hive_api::config::ServerConfig;
use hive_api::router::build_app_router;
use hive_api::state::AppState;
use hive_core::clock::{Clock, ManualClock};
use hive_events::EventBus;
use hive_monitor::client::BackendClient;

pub const TIMEOUT: Duration = Duration::from_secs(5);

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![],
        request_timeout_secs: 30,
        reconcile_interval_secs: 0,
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A running backend whose clock is pinned to 2024-07-15 12:00 UTC.
pub struct TestBackend {
    pub url: String,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestBackend {
    pub async fn start() -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap(),
        ));
        let shared: Arc<dyn Clock> = clock.clone();
        let config = test_config();
        let state = AppState::with_clock(config.clone(), Arc::new(EventBus::default()), shared);
        let url = serve(build_app_router(state.clone(), &config)).await;
        Self { url, state, clock }
    }

    pub fn client(&self) -> BackendClient {
        BackendClient::new(self.url.clone(), TIMEOUT).unwrap()
    }
}

/// A stand-in for the local ingest agent that reports one drive.
pub async fn serve_agent() -> String {
    let router = Router::new().route(
        "/available-drives",
        get(|| async {
            Json(json!({
                "locations": [
                    { "path": "/Volumes/CARD01", "available": true, "freeSpace": "12 GB" }
                ]
            }))
        }),
    );
    serve(router).await
}

/// A base URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
