//! Tracking oracle seam.
//!
//! The detector/tracker itself lives outside this crate. Implementations
//! convert whatever the engine returns into typed [`TrackedObject`]s before
//! handing them to the pipeline.

use async_trait::async_trait;

use dwell_models::TrackedObject;

use crate::error::MediaResult;
use crate::Frame;

/// Object detector with persistent track identities.
#[async_trait]
pub trait TrackingOracle: Send {
    /// Detect and track objects in one frame.
    ///
    /// With `persist` set, the tracker keeps its state between calls so the
    /// same physical object keeps its identity. Returning no objects is not an
    /// error; any `Err` is fatal to the session.
    async fn track(&mut self, frame: &Frame, persist: bool) -> MediaResult<Vec<TrackedObject>>;
}

