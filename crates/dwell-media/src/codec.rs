//! Output codec selection.

use std::collections::HashSet;
use std::fmt;
use std::process::Stdio;

use tokio::process::Command;
use tracing::warn;

use crate::error::{MediaError, MediaResult};

/// Video encoder used for the annotated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCodec {
    /// H.264 via libx264, playable in browsers
    H264,
    /// MPEG-4 Part 2, the fallback when libx264 is missing
    Mpeg4,
}

impl OutputCodec {
    /// Preference order.
    pub const PREFERENCE: [OutputCodec; 2] = [OutputCodec::H264, OutputCodec::Mpeg4];

    /// FFmpeg encoder name.
    pub fn encoder(&self) -> &'static str {
        match self {
            OutputCodec::H264 => "libx264",
            OutputCodec::Mpeg4 => "mpeg4",
        }
    }

    /// Encoder-specific output arguments.
    pub fn output_args(&self) -> Vec<&'static str> {
        match self {
            OutputCodec::H264 => vec![
                "-c:v", "libx264", "-preset", "veryfast", "-crf", "23", "-pix_fmt", "yuv420p",
            ],
            OutputCodec::Mpeg4 => vec!["-c:v", "mpeg4", "-q:v", "5", "-pix_fmt", "yuv420p"],
        }
    }

    /// Pick the first preferred codec present in `available`.
    pub fn select(available: &HashSet<String>) -> MediaResult<Self> {
        let chosen = Self::PREFERENCE
            .into_iter()
            .find(|codec| available.contains(codec.encoder()))
            .ok_or_else(|| {
                MediaError::encode_failed("Neither libx264 nor mpeg4 encoder is available")
            })?;

        if chosen != OutputCodec::H264 {
            warn!(
                codec = chosen.encoder(),
                "libx264 not available, falling back; output may not play in browsers"
            );
        }
        Ok(chosen)
    }

    /// Query FFmpeg and pick the best available codec.
    pub async fn detect() -> MediaResult<Self> {
        let encoders = list_encoders().await?;
        Self::select(&encoders)
    }
}

impl fmt::Display for OutputCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encoder())
    }
}

/// Check that FFmpeg is on the PATH.
pub fn check_ffmpeg() -> MediaResult<()> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;
    Ok(())
}

/// Names of the video encoders compiled into the local FFmpeg.
pub async fn list_encoders() -> MediaResult<HashSet<String>> {
    check_ffmpeg()?;

    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::encode_failed(format!(
            "ffmpeg -encoders failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(parse_encoders(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `ffmpeg -encoders` output. Only video encoders (`V.....`) are kept.
fn parse_encoders(listing: &str) -> HashSet<String> {
    listing
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let flags = parts.next()?;
            let name = parts.next()?;
            (flags.len() == 6 && flags.starts_with('V') && name != "=").then(|| name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10 (codec h264)
 V....D mpeg4                MPEG-4 part 2
 A....D aac                  AAC (Advanced Audio Coding)
";

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_encoders() {
        let encoders = parse_encoders(LISTING);
        assert!(encoders.contains("libx264"));
        assert!(encoders.contains("mpeg4"));
        assert!(!encoders.contains("aac"));
        assert!(!encoders.contains("="));
    }

    #[test]
    fn test_prefers_h264() {
        assert_eq!(OutputCodec::select(&set(&["mpeg4", "libx264"])).unwrap(), OutputCodec::H264);
    }

    #[test]
    fn test_falls_back_to_mpeg4() {
        assert_eq!(OutputCodec::select(&set(&["mpeg4", "libvpx"])).unwrap(), OutputCodec::Mpeg4);
    }

    #[test]
    fn test_no_usable_encoder() {
        let err = OutputCodec::select(&set(&["libvpx"])).unwrap_err();
        assert!(matches!(err, MediaError::EncodeFailure(_)));
    }
}
