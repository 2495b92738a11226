//! Structured session logging.
//!
//! Every line carries the session ID so interleaved logs from the HTTP layer
//! and the pipeline can be told apart.

use tracing::{error, info, warn, Span};

use dwell_models::SessionId;

/// Logger for the lifecycle of one processing session.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
}

impl SessionLogger {
    pub fn new(session_id: &SessionId) -> Self {
        Self {
            session_id: session_id.to_string(),
        }
    }

    /// Log the start of a session.
    pub fn log_start(&self, total_frames: u64, width: u32, height: u32, fps: f64) {
        info!(
            session_id = %self.session_id,
            total_frames,
            width,
            height,
            fps,
            "Session started"
        );
    }

    /// Periodic `processed N/M frames` line.
    pub fn log_progress(&self, current_frame: u64, total_frames: u64) {
        info!(
            session_id = %self.session_id,
            current_frame,
            total_frames,
            "Processed {}/{} frames", current_frame, total_frames
        );
    }

    /// An identity crossed the dwell threshold.
    pub fn log_violation(&self, frame: u64, violations_total: usize) {
        warn!(
            session_id = %self.session_id,
            frame,
            violations_total,
            "Dwell threshold exceeded"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(session_id = %self.session_id, "Session warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(session_id = %self.session_id, "Session failed: {}", message);
    }

    /// Log the completion of a session.
    pub fn log_completion(&self, frames: u64, violation_count: usize, has_snapshot: bool) {
        info!(
            session_id = %self.session_id,
            frames,
            violation_count,
            has_snapshot,
            "Session completed"
        );
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Span wrapping the whole session.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("session", session_id = %self.session_id)
    }
}
