#![deny(unreachable_patterns)]
//! Frame-sampled dwell-time violation pipeline.
//!
//! This crate provides:
//! - Dwell accounting per track identity with a monotone violation registry
//! - Sample-or-reuse frame scheduling against an external tracking oracle
//! - Box and label annotation of decoded RGB frames
//! - A progress reporter that publishes immutable snapshots to pollers
//! - FFmpeg/FFprobe backed frame decoding and encoding with codec fallback
//! - The orchestrator that ties them together and persists the artifacts

pub mod annotate;
pub mod artifacts;
pub mod clock;
pub mod codec;
pub mod config;
pub mod dwell;
pub mod error;
pub mod font;
pub mod logging;
pub mod metrics;
pub mod oracle;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod sampler;
pub mod sink;
pub mod source;

pub use annotate::{FrameAnnotator, ALERT_COLOR, NORMAL_COLOR};
pub use artifacts::ArtifactPaths;
pub use clock::{FrameClock, StreamClock, WallClock};
pub use codec::OutputCodec;
pub use config::{DwellTiming, PipelineConfig};
pub use dwell::{DwellLedger, DwellRecord, ViolationRegistry};
pub use error::{MediaError, MediaResult};
pub use logging::SessionLogger;
pub use oracle::TrackingOracle;
pub use pipeline::{DwellPipeline, SessionOutput};
pub use probe::{probe_video, VideoInfo};
pub use progress::ProgressReporter;
pub use sampler::{is_sample_frame, FrameStep, SamplingController};
pub use sink::{FfmpegFrameSink, FrameSink};
pub use source::{FfmpegFrameSource, FrameSource};

/// Decoded frame type used throughout the pipeline.
pub type Frame = image::RgbImage;
