//! Axum HTTP API server.
//!
//! This crate provides:
//! - Video upload that runs the dwell pipeline to completion
//! - Progress polling for the running session
//! - Delivery of the annotated video and violation snapshot
//! - Health, readiness and Prometheus endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, OracleProvider, SessionRunner};
