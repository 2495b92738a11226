//! Output artifact locations and persistence.

use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::Frame;

/// Annotated video file name inside the output directory.
pub const VIDEO_FILE: &str = "processed.mp4";
/// Snapshot file name inside the output directory.
pub const SNAPSHOT_FILE: &str = "snapshot.jpg";

const SNAPSHOT_QUALITY: u8 = 90;

/// Where a session writes its video and snapshot.
///
/// Both files are overwritten by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub video: PathBuf,
    pub snapshot: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            video: dir.join(VIDEO_FILE),
            snapshot: dir.join(SNAPSHOT_FILE),
        }
    }

    /// Create the output directory and drop any snapshot left by a previous
    /// session.
    pub async fn prepare(&self) -> MediaResult<()> {
        for parent in [self.video.parent(), self.snapshot.parent()].into_iter().flatten() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        match tokio::fs::remove_file(&self.snapshot).await {
            Ok(()) => debug!(path = %self.snapshot.display(), "Removed previous snapshot"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Encode `frame` as JPEG to the snapshot path.
    pub async fn write_snapshot(&self, frame: &Frame) -> MediaResult<PathBuf> {
        let jpeg = encode_jpeg(frame, SNAPSHOT_QUALITY)?;
        tokio::fs::write(&self.snapshot, jpeg).await?;
        Ok(self.snapshot.clone())
    }

    /// Video path, if the file exists.
    pub async fn existing_video(&self) -> MediaResult<PathBuf> {
        existing(&self.video).await
    }

    /// Snapshot path, if the file exists.
    pub async fn existing_snapshot(&self) -> MediaResult<PathBuf> {
        existing(&self.snapshot).await
    }
}

async fn existing(path: &Path) -> MediaResult<PathBuf> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(path.to_path_buf()),
        _ => Err(MediaError::NoProcessedArtifact(path.to_path_buf())),
    }
}

/// Encode an RGB frame as JPEG bytes.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> MediaResult<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode(
        frame.as_raw(),
        frame.width(),
        frame.height(),
        ColorType::Rgb8,
    )?;
    Ok(buf)
}
