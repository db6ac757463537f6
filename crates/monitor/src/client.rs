//! REST client for the Hive backend.
//!
//! Wraps the endpoints the monitor consumes (events, shot requests, the
//! ingestion job ledger and reports) using [`reqwest`]. Every backend
//! response except reports arrives in a `{ "data": ... }` envelope.

use std::time::Duration;

use hive_core::event::Event;
use hive_core::ingestion::IngestionJob;
use hive_core::process_point::ProcessPoint;
use hive_core::report::IngestionReport;
use hive_core::shot_request::ShotRequest;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Errors from the backend REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (connection refused, timeout, DNS).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ClientError {
    /// Whether the failure means the backend could not be reached at all.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// What a reconciliation pass reported back.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub shot_updates_applied: usize,
    pub jobs: Vec<IngestionJob>,
}

/// HTTP client for one backend instance.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    api_url: String,
}

impl BackendClient {
    /// * `api_url` - Base URL, e.g. `http://localhost:5001`.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- events ----

    /// `GET /events`, optionally restricted to one project.
    pub async fn list_events(&self, project_id: Option<&str>) -> Result<Vec<Event>, ClientError> {
        let mut request = self.client.get(format!("{}/events", self.api_url));
        if let Some(project_id) = project_id {
            request = request.query(&[("projectId", project_id)]);
        }
        Self::parse_data(request.send().await?).await
    }

    /// `PUT /events/{id}` with a new process point.
    pub async fn update_event_process_point(
        &self,
        event_id: &str,
        stage: ProcessPoint,
    ) -> Result<Event, ClientError> {
        let response = self
            .client
            .put(format!("{}/events/{}", self.api_url, event_id))
            .json(&serde_json::json!({ "processPoint": stage }))
            .send()
            .await?;
        Self::parse_data(response).await
    }

    // ---- shot requests ----

    /// `GET /shot-requests`, optionally restricted to one event.
    pub async fn list_shot_requests(
        &self,
        event_id: Option<&str>,
    ) -> Result<Vec<ShotRequest>, ClientError> {
        let mut request = self.client.get(format!("{}/shot-requests", self.api_url));
        if let Some(event_id) = event_id {
            request = request.query(&[("eventId", event_id)]);
        }
        Self::parse_data(request.send().await?).await
    }

    /// `POST /shot-requests`. `body` uses the backend's camelCase fields.
    pub async fn create_shot_request(
        &self,
        body: &serde_json::Value,
    ) -> Result<ShotRequest, ClientError> {
        let response = self
            .client
            .post(format!("{}/shot-requests", self.api_url))
            .json(body)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// `PUT /shot-requests/{id}` with a partial update.
    pub async fn update_shot_request(
        &self,
        shot_id: &str,
        body: &serde_json::Value,
    ) -> Result<ShotRequest, ClientError> {
        let response = self
            .client
            .put(format!("{}/shot-requests/{}", self.api_url, shot_id))
            .json(body)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    // ---- ingestion ----

    /// `GET /ingest-jobs`
    pub async fn list_ingest_jobs(&self) -> Result<Vec<IngestionJob>, ClientError> {
        let response = self
            .client
            .get(format!("{}/ingest-jobs", self.api_url))
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// `POST /ingest-jobs/reconcile`
    pub async fn reconcile(&self) -> Result<ReconcileSummary, ClientError> {
        let response = self
            .client
            .post(format!("{}/ingest-jobs/reconcile", self.api_url))
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// Fetch a report by the `reportUrl` recorded on its job. Relative URLs
    /// are resolved against the backend.
    pub async fn fetch_report(&self, report_url: &str) -> Result<IngestionReport, ClientError> {
        let url = if report_url.starts_with("http://") || report_url.starts_with("https://") {
            report_url.to_string()
        } else {
            format!("{}/{}", self.api_url, report_url.trim_start_matches('/'))
        };
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or a [`ClientError::Api`]
    /// carrying the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful `{ "data": T }` response.
    async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}
