//! Client for the external object tracking service.
//!
//! The service runs the detector and multi-object tracker. This crate sends
//! it one JPEG-encoded frame at a time and converts its loosely typed answer
//! into [`TrackedObject`](dwell_models::TrackedObject)s at the boundary.

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{OracleClient, OracleClientConfig};
pub use error::{OracleError, OracleResult};
pub use session::OracleSession;
pub use types::{HealthResponse, TrackRequest, TrackResponse};
