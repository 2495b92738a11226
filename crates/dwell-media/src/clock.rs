//! Timestamp sources for dwell accounting.

use std::time::{Duration, Instant};

use crate::config::DwellTiming;

/// Produces the timestamp recorded for a sampled frame.
pub trait FrameClock: Send + Sync {
    /// Timestamp for the frame with the given 1-based index.
    fn timestamp(&self, frame_index: u64) -> Duration;
}

/// Wall-clock time since the session started. Ignores the frame index.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl FrameClock for WallClock {
    fn timestamp(&self, _frame_index: u64) -> Duration {
        self.started.elapsed()
    }
}

/// Media time: `(frame_index - 1) / fps`.
#[derive(Debug, Clone, Copy)]
pub struct StreamClock {
    fps: f64,
}

impl StreamClock {
    /// Non-positive or non-finite rates fall back to 30 fps.
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        Self { fps }
    }
}

impl FrameClock for StreamClock {
    fn timestamp(&self, frame_index: u64) -> Duration {
        Duration::from_secs_f64(frame_index.saturating_sub(1) as f64 / self.fps)
    }
}

/// Build the clock for a session.
pub fn session_clock(timing: DwellTiming, fps: f64) -> Box<dyn FrameClock> {
    match timing {
        DwellTiming::Wall => Box::new(WallClock::start()),
        DwellTiming::Stream => Box::new(StreamClock::new(fps)),
    }
}
