//! Session progress state for polling clients.
//!
//! A processing session moves `idle -> processing -> {completed, error}`.
//! The state is a small value type; the pipeline publishes whole snapshots of
//! it so a reader never sees a half-updated record.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one processing session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session has started yet
    #[default]
    Idle,
    /// Frames are being processed
    Processing,
    /// Output artifacts were written
    Completed,
    /// The session aborted on a fatal error
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::Error => "error",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Error)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the current session's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct SessionState {
    /// Percentage of frames processed, rounded to two decimals
    pub progress: f64,
    /// 1-based index of the last processed frame
    pub current_frame: u64,
    /// Frame count reported by the input container
    pub total_frames: u64,
    /// Lifecycle status
    pub status: SessionStatus,
    /// When the snapshot was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// State for a session that is starting with a known frame count.
    pub fn started(total_frames: u64) -> Self {
        Self {
            progress: 0.0,
            current_frame: 0,
            total_frames,
            status: SessionStatus::Processing,
            updated_at: Some(Utc::now()),
        }
    }

    /// Copy of this state advanced to `frame_index`.
    pub fn advanced(&self, frame_index: u64) -> Self {
        Self {
            progress: progress_percent(frame_index, self.total_frames),
            current_frame: frame_index,
            total_frames: self.total_frames,
            status: self.status,
            updated_at: Some(Utc::now()),
        }
    }

    /// Copy of this state marked completed.
    pub fn completed(&self) -> Self {
        Self {
            progress: 100.0,
            status: SessionStatus::Completed,
            updated_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Copy of this state marked failed. Counters keep their last values.
    pub fn failed(&self) -> Self {
        Self {
            status: SessionStatus::Error,
            updated_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Check if the session is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// `round(100 * frame / total, 2)`, or 0 when the total is unknown.
pub fn progress_percent(frame_index: u64, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    let percent = frame_index as f64 / total_frames as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}
