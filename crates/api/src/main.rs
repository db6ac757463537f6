use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hive_api::background;
use hive_api::config::ServerConfig;
use hive_api::notifications::NotificationRouter;
use hive_api::router::build_app_router;
use hive_api::state::AppState;
use hive_events::EventBus;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hive_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // --- App state ---
    let state = AppState::new(config.clone(), Arc::clone(&event_bus));

    // Spawn notification router (files Request More events in the inbox).
    let notification_router = NotificationRouter::new(Arc::clone(&state.inbox));
    let router_handle = tokio::spawn(notification_router.run(event_bus.subscribe()));

    // Spawn periodic reconciliation of completed ingestion jobs.
    let reconcile_cancel = CancellationToken::new();
    let reconcile_handle = (config.reconcile_interval_secs > 0).then(|| {
        tokio::spawn(background::reconcile::run(
            state.clone(),
            Duration::from_secs(config.reconcile_interval_secs),
            reconcile_cancel.clone(),
        ))
    });
    if reconcile_handle.is_none() {
        tracing::info!("Background reconciliation disabled");
    }

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reconcile_cancel.cancel();
    if let Some(handle) = reconcile_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Reconciliation job stopped");
    }

    // The app (and its state clone of the bus) is gone once serve returns;
    // dropping the last sender closes the channel and stops the router.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), router_handle).await;
    tracing::info!("Notification router shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
