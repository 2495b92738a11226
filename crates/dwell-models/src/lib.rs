//! Shared data models for the dwell-time violation pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Track identities and pixel rectangles reported by the tracking oracle
//! - Per-frame detections drawn onto the output video
//! - Session progress snapshots polled by clients
//! - The summary returned when a session completes

pub mod detection;
pub mod rect;
pub mod session;
pub mod summary;
pub mod track;

// Re-export common types
pub use detection::{Detection, TrackedObject};
pub use rect::PixelRect;
pub use session::{SessionId, SessionState, SessionStatus};
pub use summary::ProcessingSummary;
pub use track::TrackId;
