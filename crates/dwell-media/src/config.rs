//! Pipeline configuration.

use std::time::Duration;

/// Source of the timestamps fed to the dwell ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DwellTiming {
    /// Wall-clock time at which each sample is processed.
    ///
    /// Measured dwell depends on processing speed, not on the video's frame rate.
    #[default]
    Wall,
    /// Media time derived from the frame index and the input frame rate.
    Stream,
}

impl DwellTiming {
    /// Parse `wall` / `stream` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "wall" | "wallclock" | "wall_clock" => Some(DwellTiming::Wall),
            "stream" | "media" => Some(DwellTiming::Stream),
            _ => None,
        }
    }
}

/// Dwell pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Dwell time at or above which an object is a violation
    pub stay_threshold: Duration,
    /// Sample every Nth frame (frame 1 is always sampled)
    pub frame_skip: u64,
    /// Timestamp source for dwell accounting
    pub timing: DwellTiming,
    /// Log a progress line every N frames
    pub progress_log_interval: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stay_threshold: Duration::from_secs(20),
            frame_skip: 5,
            timing: DwellTiming::Wall,
            progress_log_interval: 30,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            stay_threshold: Duration::from_secs_f64(
                std::env::var("STAY_THRESHOLD")
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok())
                    .filter(|secs| secs.is_finite() && *secs >= 0.0)
                    .unwrap_or(20.0),
            ),
            frame_skip: std::env::var("FRAME_SKIP")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(5)
                .max(1),
            timing: std::env::var("DWELL_TIMING")
                .ok()
                .and_then(|s| DwellTiming::parse(&s))
                .unwrap_or_default(),
            progress_log_interval: std::env::var("PROGRESS_LOG_INTERVAL")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(30)
                .max(1),
        }
    }

    /// Builder-style override of the stay threshold.
    pub fn with_stay_threshold(mut self, threshold: Duration) -> Self {
        self.stay_threshold = threshold;
        self
    }

    /// Builder-style override of the frame skip. Zero is treated as one.
    pub fn with_frame_skip(mut self, frame_skip: u64) -> Self {
        self.frame_skip = frame_skip.max(1);
        self
    }

    /// Builder-style override of the timing source.
    pub fn with_timing(mut self, timing: DwellTiming) -> Self {
        self.timing = timing;
        self
    }
}
