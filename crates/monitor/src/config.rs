use std::time::Duration;

use hive_core::event_status::STATUS_TICK_INTERVAL;

/// Monitor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Backend base URL (default: `http://localhost:5001`).
    pub api_url: String,
    /// Local ingest agent base URL (default: `http://localhost:8765`).
    pub agent_url: String,
    /// Seconds between event status recomputations (default: `60`).
    pub status_tick_secs: u64,
    /// Seconds between job polls and agent checks (default: `30`).
    pub job_poll_secs: u64,
    /// Project whose events are watched. All events when unset.
    pub project_id: Option<String>,
    /// Per-request HTTP timeout in seconds (default: `10`).
    pub http_timeout_secs: u64,
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var             | Default                 |
    /// |---------------------|-------------------------|
    /// | `HIVE_API_URL`      | `http://localhost:5001` |
    /// | `LOCAL_AGENT_URL`   | `http://localhost:8765` |
    /// | `STATUS_TICK_SECS`  | `60`                    |
    /// | `JOB_POLL_SECS`     | `30`                    |
    /// | `PROJECT_ID`        | unset                   |
    /// | `HTTP_TIMEOUT_SECS` | `10`                    |
    pub fn from_env() -> Self {
        let api_url = std::env::var("HIVE_API_URL")
            .unwrap_or_else(|_| "http://localhost:5001".into())
            .trim_end_matches('/')
            .to_string();

        let agent_url = std::env::var("LOCAL_AGENT_URL")
            .unwrap_or_else(|_| "http://localhost:8765".into())
            .trim_end_matches('/')
            .to_string();

        let status_tick_secs: u64 = std::env::var("STATUS_TICK_SECS")
            .unwrap_or_else(|_| STATUS_TICK_INTERVAL.as_secs().to_string())
            .parse()
            .expect("STATUS_TICK_SECS must be a valid u64");

        let job_poll_secs: u64 = std::env::var("JOB_POLL_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("JOB_POLL_SECS must be a valid u64");

        let project_id = std::env::var("PROJECT_ID")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let http_timeout_secs: u64 = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("HTTP_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            agent_url,
            status_tick_secs,
            job_poll_secs,
            project_id,
            http_timeout_secs,
        }
    }

    pub fn status_tick(&self) -> Duration {
        Duration::from_secs(self.status_tick_secs.max(1))
    }

    pub fn job_poll(&self) -> Duration {
        Duration::from_secs(self.job_poll_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
