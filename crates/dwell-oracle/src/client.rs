//! Tracking service HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use dwell_models::{SessionId, TrackedObject};

use crate::error::{OracleError, OracleResult};
use crate::session::OracleSession;
use crate::types::{HealthResponse, TrackRequest, TrackResponse};

/// Configuration for the tracking client.
#[derive(Debug, Clone)]
pub struct OracleClientConfig {
    /// Base URL of the tracking service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// JPEG quality for uploaded frames (1-100)
    pub jpeg_quality: u8,
}

impl Default for OracleClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(60),
            jpeg_quality: 90,
        }
    }
}

impl OracleClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ORACLE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: Duration::from_secs(
                std::env::var("ORACLE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            jpeg_quality: std::env::var("ORACLE_JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse::<u8>().ok())
                .unwrap_or(90)
                .clamp(1, 100),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Client for the tracking service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct OracleClient {
    http: Client,
    config: OracleClientConfig,
}

impl OracleClient {
    /// Create a new tracking client.
    pub fn new(config: OracleClientConfig) -> OracleResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(OracleError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> OracleResult<Self> {
        Self::new(OracleClientConfig::from_env())
    }

    pub fn config(&self) -> &OracleClientConfig {
        &self.config
    }

    /// Start a tracking session. Tracker state is isolated per session.
    pub fn session(&self, session_id: &SessionId) -> OracleSession {
        OracleSession::new(self.clone(), session_id.clone())
    }

    /// Check if the tracking service is healthy.
    pub async fn health_check(&self) -> OracleResult<bool> {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("Tracking service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Tracking service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Send one frame to the tracker. Not retried.
    pub async fn track(&self, request: &TrackRequest) -> OracleResult<Vec<TrackedObject>> {
        let url = format!("{}/track", self.config.base_url);

        debug!(
            session_id = %request.session_id,
            width = request.width,
            height = request.height,
            "Sending track request to {}", url
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    OracleError::ServiceUnavailable(e.to_string())
                } else {
                    OracleError::Network(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::RequestFailed(format!(
                "Tracking service returned {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await?;
        let track: TrackResponse = serde_json::from_slice(&bytes)?;
        track.into_tracked(request.width, request.height)
    }
}
