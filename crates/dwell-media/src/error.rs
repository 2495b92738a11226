//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during a processing session.
///
/// Every variant except `NoInputProvided` and `NoProcessedArtifact` is fatal to
/// the session that raised it.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("No video file provided")]
    NoInputProvided,

    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Decode failed: {0}")]
    DecodeFailure(String),

    #[error("Encode failed: {0}")]
    EncodeFailure(String),

    #[error("Tracking oracle failed: {0}")]
    OracleFailure(String),

    #[error("No processed artifact: {0}")]
    NoProcessedArtifact(PathBuf),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a decode failure error.
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::DecodeFailure(message.into())
    }

    /// Create an encode failure error.
    pub fn encode_failed(message: impl Into<String>) -> Self {
        Self::EncodeFailure(message.into())
    }

    /// Create a tracking oracle failure error.
    pub fn oracle_failed(message: impl Into<String>) -> Self {
        Self::OracleFailure(message.into())
    }

    /// Whether the error is caused by the caller rather than the session.
    pub fn is_user_error(&self) -> bool {
        matches!(self, MediaError::NoInputProvided)
    }

    /// Short machine-readable kind, used for metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaError::NoInputProvided => "no_input",
            MediaError::FfmpegNotFound | MediaError::FfprobeNotFound => "tool_missing",
            MediaError::FfprobeFailed { .. } | MediaError::DecodeFailure(_) => "decode",
            MediaError::EncodeFailure(_) => "encode",
            MediaError::OracleFailure(_) => "oracle",
            MediaError::NoProcessedArtifact(_) => "not_found",
            MediaError::Image(_) | MediaError::Io(_) | MediaError::JsonParse(_) => "io",
        }
    }
}
