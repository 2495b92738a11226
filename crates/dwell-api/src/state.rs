//! Application state.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use dwell_media::{
    ArtifactPaths, DwellPipeline, MediaResult, PipelineConfig, ProgressReporter, SessionOutput,
    TrackingOracle,
};
use dwell_models::SessionId;
use dwell_oracle::OracleClient;

use crate::config::ApiConfig;

/// Source of per-upload tracking sessions.
#[async_trait]
pub trait OracleProvider: Send + Sync {
    /// Open a tracker session for one upload.
    fn open_session(&self, session_id: &SessionId) -> Box<dyn TrackingOracle>;

    /// Whether the tracker can currently serve requests.
    async fn is_ready(&self) -> bool;
}

#[async_trait]
impl OracleProvider for OracleClient {
    fn open_session(&self, session_id: &SessionId) -> Box<dyn TrackingOracle> {
        Box::new(self.session(session_id))
    }

    async fn is_ready(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }
}

/// Runs one upload from the saved input file to finished artifacts.
#[async_trait]
pub trait SessionRunner: Send + Sync {
    async fn run_session(
        &self,
        session_id: &SessionId,
        input: &Path,
        oracle: &mut dyn TrackingOracle,
        progress: &ProgressReporter,
        artifacts: &ArtifactPaths,
    ) -> MediaResult<SessionOutput>;
}

#[async_trait]
impl SessionRunner for DwellPipeline {
    async fn run_session(
        &self,
        session_id: &SessionId,
        input: &Path,
        oracle: &mut dyn TrackingOracle,
        progress: &ProgressReporter,
        artifacts: &ArtifactPaths,
    ) -> MediaResult<SessionOutput> {
        self.process_file(session_id, input, oracle, progress, artifacts)
            .await
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<dyn SessionRunner>,
    pub oracle: Arc<dyn OracleProvider>,
    pub progress: ProgressReporter,
    pub artifacts: ArtifactPaths,
    session_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create new application state with the HTTP tracking client.
    pub fn new(
        config: ApiConfig,
        pipeline_config: PipelineConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let oracle = OracleClient::from_env()?;
        Ok(Self::with_oracle(config, pipeline_config, Arc::new(oracle)))
    }

    /// Create state around an arbitrary tracker.
    pub fn with_oracle(
        config: ApiConfig,
        pipeline_config: PipelineConfig,
        oracle: Arc<dyn OracleProvider>,
    ) -> Self {
        Self::with_runner(
            config,
            Arc::new(DwellPipeline::new(pipeline_config)),
            oracle,
        )
    }

    /// Create state around an arbitrary session runner and tracker.
    pub fn with_runner(
        config: ApiConfig,
        pipeline: Arc<dyn SessionRunner>,
        oracle: Arc<dyn OracleProvider>,
    ) -> Self {
        let artifacts = ArtifactPaths::in_dir(&config.processed_dir);
        Self {
            config,
            pipeline,
            oracle,
            progress: ProgressReporter::new(),
            artifacts,
            session_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Claim the single processing slot. `None` while another upload runs.
    pub fn try_begin_session(&self) -> Option<OwnedMutexGuard<()>> {
        Arc::clone(&self.session_lock).try_lock_owned().ok()
    }
}
