//! `hive-monitor` -- polling dashboard daemon.
//!
//! Re-derives event statuses on a fixed tick, checks the local ingest agent
//! and has the backend reconcile completed ingestion jobs.
//!
//! # Environment variables
//!
//! See [`MonitorConfig::from_env`](hive_monitor::config::MonitorConfig::from_env).

use std::sync::Arc;

use hive_core::clock::{Clock, SystemClock};
use hive_events::{AppSelection, EventBus, EventKind, Selection};
use hive_monitor::agent_check::AgentCheck;
use hive_monitor::client::BackendClient;
use hive_monitor::config::MonitorConfig;
use hive_monitor::monitor::Monitor;
use hive_monitor::scheduler::Scheduler;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hive_monitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MonitorConfig::from_env();
    tracing::info!(
        api_url = %config.api_url,
        agent_url = %config.agent_url,
        project_id = ?config.project_id,
        status_tick_secs = config.status_tick_secs,
        job_poll_secs = config.job_poll_secs,
        "Starting hive-monitor",
    );

    let bus = Arc::new(EventBus::default());
    let selection = Arc::new(AppSelection::with_initial(
        Arc::clone(&bus),
        Selection {
            organization_id: None,
            project_id: config.project_id.clone(),
        },
    ));

    let client = BackendClient::new(config.api_url.clone(), config.http_timeout())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        });
    let agent = AgentCheck::new(config.agent_url.clone(), config.http_timeout(), Arc::clone(&bus));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let monitor = Arc::new(Monitor::new(client, agent, Arc::clone(&selection), clock));

    let cancel = CancellationToken::new();

    // Refresh the board right away when the watched project changes.
    let mut selection_rx = bus.subscribe();

    let status_monitor = Arc::clone(&monitor);
    let status_scheduler = Scheduler::spawn_with_token(
        "status-tick",
        config.status_tick(),
        cancel.child_token(),
        move || {
            let monitor = Arc::clone(&status_monitor);
            async move {
                if let Err(e) = monitor.refresh_statuses().await {
                    tracing::warn!(error = %e, transient = e.is_transient(), "Event refresh failed");
                }
            }
        },
    );

    let job_monitor = Arc::clone(&monitor);
    let job_scheduler = Scheduler::spawn_with_token(
        "job-poll",
        config.job_poll(),
        cancel.child_token(),
        move || {
            let monitor = Arc::clone(&job_monitor);
            async move {
                if let Err(e) = monitor.poll_jobs().await {
                    tracing::warn!(error = %e, transient = e.is_transient(), "Job poll failed");
                }
            }
        },
    );

    let status_handle = status_scheduler.handle();
    let selection_task = tokio::spawn(async move {
        while let Ok(event) = selection_rx.recv().await {
            match event.kind {
                EventKind::SelectionChanged { project_id, .. } => {
                    tracing::info!(project_id = ?project_id, "Watched project changed");
                    status_handle.tick_now();
                }
                EventKind::AgentConnectionChanged { connected, detail } => {
                    tracing::info!(connected, detail = %detail, "Agent connection status");
                }
                _ => {}
            }
        }
    });

    shutdown_signal().await;
    tracing::info!("Stopping schedulers");

    cancel.cancel();
    status_scheduler.shutdown().await;
    job_scheduler.shutdown().await;
    selection_task.abort();

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C)"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
