//! Tracking service error types.

use dwell_media::MediaError;
use thiserror::Error;

pub type OracleResult<T> = Result<T, OracleError>;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Tracking service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Frame encoding failed: {0}")]
    Encode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OracleError {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

/// Every tracking service error is fatal to the session.
impl From<OracleError> for MediaError {
    fn from(err: OracleError) -> Self {
        MediaError::OracleFailure(err.to_string())
    }
}
