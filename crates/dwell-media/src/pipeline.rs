//! Session orchestration.
//!
//! One session decodes every frame of the input in order, runs the sampling
//! step, draws the render list, encodes the frame and publishes progress. On
//! end of stream the snapshot is persisted and the video finalized.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::Instrument;

use dwell_models::SessionId;

use crate::annotate::FrameAnnotator;
use crate::artifacts::ArtifactPaths;
use crate::clock::{session_clock, FrameClock};
use crate::codec::OutputCodec;
use crate::config::PipelineConfig;
use crate::error::MediaResult;
use crate::logging::SessionLogger;
use crate::metrics;
use crate::oracle::TrackingOracle;
use crate::progress::ProgressReporter;
use crate::sampler::SamplingController;
use crate::sink::{FfmpegFrameSink, FrameSink};
use crate::source::{FfmpegFrameSource, FrameSource};

/// Result of a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutput {
    /// Distinct identities that ever reached violation status
    pub violation_count: usize,
    /// Annotated video
    pub video_path: PathBuf,
    /// Raw copy of the last sampled frame, if any frame was sampled
    pub snapshot_path: Option<PathBuf>,
    /// Frames decoded and written
    pub frames_processed: u64,
}

/// Runs dwell-time sessions.
#[derive(Debug, Clone, Default)]
pub struct DwellPipeline {
    config: PipelineConfig,
    annotator: FrameAnnotator,
}

impl DwellPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            annotator: FrameAnnotator::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode `input` with FFmpeg and write artifacts to `artifacts`.
    pub async fn process_file(
        &self,
        session_id: &SessionId,
        input: impl AsRef<Path>,
        oracle: &mut dyn TrackingOracle,
        progress: &ProgressReporter,
        artifacts: &ArtifactPaths,
    ) -> MediaResult<SessionOutput> {
        let opened = async {
            let source = FfmpegFrameSource::open(input.as_ref()).await?;
            let codec = OutputCodec::detect().await?;
            let info = source.info();
            let sink =
                FfmpegFrameSink::create(&artifacts.video, info.width, info.height, info.fps, codec)?;
            Ok::<_, crate::error::MediaError>((source, sink))
        }
        .await;

        let (mut source, mut sink) = match opened {
            Ok(pair) => pair,
            Err(e) => {
                SessionLogger::new(session_id).log_error(&e.to_string());
                progress.reset(0);
                progress.fail();
                metrics::record_session(e.kind(), 0.0);
                return Err(e);
            }
        };

        self.run(session_id, &mut source, &mut sink, oracle, progress, artifacts)
            .await
    }

    /// Run a session with the clock selected by the configuration.
    pub async fn run(
        &self,
        session_id: &SessionId,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        oracle: &mut dyn TrackingOracle,
        progress: &ProgressReporter,
        artifacts: &ArtifactPaths,
    ) -> MediaResult<SessionOutput> {
        let clock = session_clock(self.config.timing, source.info().fps);
        self.run_with_clock(session_id, source, sink, oracle, progress, artifacts, clock.as_ref())
            .await
    }

    /// Run a session with an explicit timestamp source.
    ///
    /// Any error leaves the progress status at `error`; partial output stays
    /// on disk.
    #[allow(clippy::too_many_arguments)]
    pub async fn run_with_clock(
        &self,
        session_id: &SessionId,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        oracle: &mut dyn TrackingOracle,
        progress: &ProgressReporter,
        artifacts: &ArtifactPaths,
        clock: &dyn FrameClock,
    ) -> MediaResult<SessionOutput> {
        let logger = SessionLogger::new(session_id);
        let span = logger.create_span();
        let started = Instant::now();

        let result = self
            .execute(&logger, source, sink, oracle, progress, artifacts, clock)
            .instrument(span)
            .await;

        let elapsed = started.elapsed().as_secs_f64();
        match &result {
            Ok(output) => {
                logger.log_completion(
                    output.frames_processed,
                    output.violation_count,
                    output.snapshot_path.is_some(),
                );
                metrics::record_session("completed", elapsed);
            }
            Err(e) => {
                progress.fail();
                logger.log_error(&e.to_string());
                metrics::record_session(e.kind(), elapsed);
            }
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute(
        &self,
        logger: &SessionLogger,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        oracle: &mut dyn TrackingOracle,
        progress: &ProgressReporter,
        artifacts: &ArtifactPaths,
        clock: &dyn FrameClock,
    ) -> MediaResult<SessionOutput> {
        let info = source.info().clone();
        progress.reset(info.total_frames);
        artifacts.prepare().await?;
        logger.log_start(info.total_frames, info.width, info.height, info.fps);

        let mut controller =
            SamplingController::new(self.config.frame_skip, self.config.stay_threshold);
        let log_every = self.config.progress_log_interval.max(1);
        let mut frame_index = 0u64;

        while let Some(mut frame) = source.read_frame().await? {
            frame_index += 1;
            let timestamp = clock.timestamp(frame_index);

            let query_started = Instant::now();
            let step = controller
                .step(frame_index, &frame, timestamp, oracle)
                .await?;
            if step.sampled {
                metrics::record_sample(query_started.elapsed().as_secs_f64());
            }
            if step.new_violations > 0 {
                metrics::record_violations(step.new_violations);
                logger.log_violation(frame_index, controller.violation_count());
            }

            self.annotator.annotate(&mut frame, &step.render_list);
            sink.write_frame(&frame).await?;

            progress.advance(frame_index);
            metrics::record_frame();
            if frame_index % log_every == 0 {
                logger.log_progress(frame_index, info.total_frames);
            }
        }

        if frame_index == 0 {
            logger.log_warning("input contained no frames");
        }

        let snapshot_path = match controller.take_snapshot() {
            Some(snapshot) => Some(artifacts.write_snapshot(&snapshot).await?),
            None => None,
        };

        sink.finish().await?;
        progress.complete();

        Ok(SessionOutput {
            violation_count: controller.violation_count(),
            video_path: artifacts.video.clone(),
            snapshot_path,
            frames_processed: frame_index,
        })
    }
}
