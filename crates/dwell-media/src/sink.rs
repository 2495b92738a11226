//! Frame encoding.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::codec::{check_ffmpeg, OutputCodec};
use crate::error::{MediaError, MediaResult};
use crate::Frame;

/// Ordered consumer of annotated frames.
#[async_trait]
pub trait FrameSink: Send {
    /// Append one frame to the output.
    async fn write_frame(&mut self, frame: &Frame) -> MediaResult<()>;

    /// Flush and close the output. Must be called exactly once.
    async fn finish(&mut self) -> MediaResult<()>;
}

/// Encodes frames into a video file through an FFmpeg child process.
pub struct FfmpegFrameSink {
    path: PathBuf,
    codec: OutputCodec,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<String>>,
    frames_written: u64,
}

impl FfmpegFrameSink {
    /// Start an encoder writing `width`x`height` frames at `fps` to `path`.
    pub fn create(
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        fps: f64,
        codec: OutputCodec,
    ) -> MediaResult<Self> {
        check_ffmpeg()?;
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", &format!("{}x{}", width, height)])
            .args(["-r", &format!("{:.3}", fps)])
            .args(["-i", "-"])
            // yuv420p needs even dimensions
            .args(["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"])
            .args(codec.output_args())
            .args(["-movflags", "+faststart"])
            .arg(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| MediaError::encode_failed(format!("Failed to spawn FFmpeg: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MediaError::encode_failed("Failed to capture FFmpeg stdin"))?;

        let stderr = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text).await;
                text
            })
        });

        info!(
            output = %path.display(),
            codec = %codec,
            width,
            height,
            fps,
            "Started FFmpeg encoder"
        );

        Ok(Self {
            path,
            codec,
            child,
            stdin: Some(stdin),
            stderr,
            frames_written: 0,
        })
    }

    pub fn codec(&self) -> OutputCodec {
        self.codec
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    async fn collect_stderr(&mut self) -> String {
        match self.stderr.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        }
    }
}

#[async_trait]
impl FrameSink for FfmpegFrameSink {
    async fn write_frame(&mut self, frame: &Frame) -> MediaResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| MediaError::encode_failed("Encoder already finished"))?;

        if let Err(e) = stdin.write_all(frame.as_raw()).await {
            let stderr = self.collect_stderr().await;
            return Err(MediaError::encode_failed(format!(
                "Failed to write frame {}: {} {}",
                self.frames_written + 1,
                e,
                stderr.trim()
            )));
        }

        self.frames_written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> MediaResult<()> {
        // Closing stdin signals end of input
        if let Some(mut stdin) = self.stdin.take() {
            let _ = stdin.shutdown().await;
        }

        let status = self.child.wait().await?;
        let stderr = self.collect_stderr().await;

        if self.frames_written == 0 {
            // FFmpeg refuses to mux an empty stream; leave an empty file instead
            tokio::fs::File::create(&self.path).await?;
            debug!(output = %self.path.display(), "No frames written, created empty output");
            return Ok(());
        }

        if !status.success() {
            return Err(MediaError::encode_failed(format!(
                "FFmpeg encoder exited with {:?}: {}",
                status.code(),
                stderr.trim()
            )));
        }

        debug!(
            output = %self.path.display(),
            frames = self.frames_written,
            "Encoder finished"
        );
        Ok(())
    }
}
