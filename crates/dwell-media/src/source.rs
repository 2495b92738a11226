//! Frame decoding.
//!
//! [`FfmpegFrameSource`] pipes the input through `ffmpeg -f rawvideo -pix_fmt rgb24`
//! and cuts the byte stream into fixed-size frames.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_video, VideoInfo};
use crate::Frame;

/// Ordered stream of decoded frames.
#[async_trait]
pub trait FrameSource: Send {
    /// Stream metadata.
    fn info(&self) -> &VideoInfo;

    /// Next frame, or `None` at end of stream.
    async fn read_frame(&mut self) -> MediaResult<Option<Frame>>;
}

/// Splits a packed RGB24 byte stream into frames.
pub struct RawFrameReader<R> {
    reader: R,
    width: u32,
    height: u32,
    frames_read: u64,
}

impl<R: AsyncRead + Unpin + Send> RawFrameReader<R> {
    pub fn new(reader: R, width: u32, height: u32) -> Self {
        Self {
            reader,
            width,
            height,
            frames_read: 0,
        }
    }

    /// Read one frame. A clean EOF yields `None`, a partial frame is an error.
    pub async fn next_frame(&mut self) -> MediaResult<Option<Frame>> {
        let frame_bytes = self.width as usize * self.height as usize * 3;
        let mut buf = vec![0u8; frame_bytes];

        let mut filled = 0;
        while filled < frame_bytes {
            let n = self.reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < frame_bytes {
            return Err(MediaError::decode_failed(format!(
                "Truncated frame {}: got {} of {} bytes",
                self.frames_read + 1,
                filled,
                frame_bytes
            )));
        }

        self.frames_read += 1;
        Frame::from_raw(self.width, self.height, buf)
            .map(Some)
            .ok_or_else(|| MediaError::decode_failed("Frame buffer size mismatch"))
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

/// Decodes a video file through an FFmpeg child process.
pub struct FfmpegFrameSource {
    info: VideoInfo,
    child: Child,
    frames: RawFrameReader<ChildStdout>,
    stderr: Option<JoinHandle<String>>,
    finished: bool,
}

impl FfmpegFrameSource {
    /// Probe `path` and start decoding it.
    pub async fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        let info = probe_video(path).await?;

        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        if info.rotation != 0 {
            debug!(
                rotation = info.rotation,
                "Ignoring display rotation, decoding in coded orientation"
            );
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(decoder_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            input = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            "Starting FFmpeg decoder"
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| MediaError::decode_failed(format!("Failed to spawn FFmpeg: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::decode_failed("Failed to capture FFmpeg stdout"))?;

        let stderr = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text).await;
                text
            })
        });

        Ok(Self {
            frames: RawFrameReader::new(stdout, info.width, info.height),
            info,
            child,
            stderr,
            finished: false,
        })
    }

    async fn collect_stderr(&mut self) -> String {
        match self.stderr.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Reap the decoder once stdout is exhausted.
    async fn finish(&mut self) -> MediaResult<()> {
        self.finished = true;
        let status = self.child.wait().await?;
        let stderr = self.collect_stderr().await;

        if !status.success() {
            return Err(MediaError::decode_failed(format!(
                "FFmpeg decoder exited with {:?}: {}",
                status.code(),
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            warn!(stderr = %stderr.trim(), "FFmpeg decoder reported errors");
        }
        Ok(())
    }
}

/// Decoder arguments. Frames must come out at the probed coded size, so
/// FFmpeg's automatic rotation is disabled.
fn decoder_args(input: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-nostdin",
        "-noautorotate",
        "-i",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(input.as_os_str().to_owned());
    args.extend(
        ["-an", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"]
            .into_iter()
            .map(OsString::from),
    );
    args
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    async fn read_frame(&mut self) -> MediaResult<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }

        match self.frames.next_frame().await {
            Ok(Some(frame)) => Ok(Some(frame)),
            Ok(None) => {
                self.finish().await?;
                debug!(frames = self.frames.frames_read(), "Decoder reached end of stream");
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                let _ = self.child.kill().await;
                Err(e)
            }
        }
    }
}
