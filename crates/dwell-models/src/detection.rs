//! Tracked objects and render-ready detections.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rect::PixelRect;
use crate::track::TrackId;

/// One object returned by the tracking oracle for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TrackedObject {
    /// Box in pixel coordinates
    pub rect: PixelRect,
    /// Identity assigned by the tracker
    pub track_id: TrackId,
}

impl TrackedObject {
    pub fn new(rect: PixelRect, track_id: TrackId) -> Self {
        Self { rect, track_id }
    }
}

/// A tracked object annotated with its dwell accounting at the last sample point.
///
/// Detections are only valid until the next sample point; skipped frames
/// redraw them verbatim, including their frozen duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Box in pixel coordinates
    pub rect: PixelRect,
    /// Identity assigned by the tracker
    pub track_id: TrackId,
    /// Seconds between first and most recent observation
    pub dwell_secs: f64,
    /// Whether the dwell time reached the configured threshold
    pub is_violating: bool,
}

impl Detection {
    /// Label drawn above the box, e.g. `ID 7 | 12.5s`.
    pub fn label(&self) -> String {
        format!("ID {} | {:.1}s", self.track_id, self.dwell_secs)
    }
}
