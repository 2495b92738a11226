//! Tracking service request/response types.

use serde::{Deserialize, Serialize};

use dwell_models::{PixelRect, TrackId, TrackedObject};

use crate::error::{OracleError, OracleResult};

/// Request to detect and track objects in one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRequest {
    /// Tracker state is kept per session
    pub session_id: String,
    /// Keep tracker state between calls
    pub persist: bool,
    pub width: u32,
    pub height: u32,
    /// Base64-encoded JPEG
    pub image: String,
}

/// Raw tracker answer.
///
/// `ids` is `null` when the tracker has not assigned identities to anything in
/// the frame, which happens on frames without detections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackResponse {
    #[serde(default)]
    pub boxes: Vec<[f64; 4]>,
    #[serde(default)]
    pub ids: Option<Vec<f64>>,
}

impl TrackResponse {
    /// Convert into typed objects.
    ///
    /// Coordinates and identities are truncated toward zero and boxes are
    /// clamped to the `width`x`height` frame. A response without identities
    /// yields no objects even if it carries boxes.
    pub fn into_tracked(self, width: u32, height: u32) -> OracleResult<Vec<TrackedObject>> {
        let Some(ids) = self.ids else {
            return Ok(Vec::new());
        };

        if ids.len() != self.boxes.len() {
            return Err(OracleError::invalid_response(format!(
                "{} boxes but {} ids",
                self.boxes.len(),
                ids.len()
            )));
        }

        self.boxes
            .iter()
            .zip(ids)
            .map(|(xyxy, id)| {
                if !id.is_finite() || id < 0.0 {
                    return Err(OracleError::invalid_response(format!("bad track id {}", id)));
                }
                if xyxy.iter().any(|v| !v.is_finite()) {
                    return Err(OracleError::invalid_response(format!("bad box {:?}", xyxy)));
                }
                Ok(TrackedObject::new(
                    PixelRect::from_xyxy(*xyxy).clamped(width, height, 0),
                    TrackId::new(id as u64),
                ))
            })
            .collect()
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}
