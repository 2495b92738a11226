//! Video upload and processing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use tokio::io::AsyncWriteExt;
use tracing::info;

use dwell_media::MediaError;
use dwell_models::{ProcessingSummary, SessionId};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Multipart field names accepted for the video.
const VIDEO_FIELDS: [&str; 2] = ["video", "file"];

/// Save the uploaded video and process it to completion.
///
/// Only one upload is processed at a time; a second one gets 409 while the
/// first is running. The session runs on its own task holding the slot, so it
/// still finishes if the client goes away.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ProcessingSummary>> {
    let Some(slot) = state.try_begin_session() else {
        metrics::record_upload_rejected("busy");
        return Err(ApiError::conflict("A video is already being processed"));
    };

    let Some(input) = save_upload(&mut multipart, &state.config.input_path()).await? else {
        metrics::record_upload_rejected("no_file");
        return Err(MediaError::NoInputProvided.into());
    };

    let session_id = SessionId::new();
    info!(session_id = %session_id, input = %input.display(), "Upload received");

    let mut oracle = state.oracle.open_session(&session_id);
    let pipeline = Arc::clone(&state.pipeline);
    let progress = state.progress.clone();
    let artifacts = state.artifacts.clone();

    let session = tokio::spawn(async move {
        let _slot = slot;
        pipeline
            .run_session(&session_id, &input, oracle.as_mut(), &progress, &artifacts)
            .await
    });

    let output = session
        .await
        .map_err(|e| ApiError::internal(format!("Processing task failed: {}", e)))??;

    let base = state.config.artifact_base_url().await;
    Ok(Json(ProcessingSummary {
        violation_count: output.violation_count,
        video_url: format!("{}/processed_video_file", base),
        snapshot_url: output
            .snapshot_path
            .map(|_| format!("{}/processed_snapshot", base)),
    }))
}

/// Stream the first non-empty video field to `dest`.
async fn save_upload(multipart: &mut Multipart, dest: &Path) -> ApiResult<Option<PathBuf>> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if !field.name().is_some_and(|name| VIDEO_FIELDS.contains(&name)) {
            continue;
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0usize;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::bad_request(format!("Upload interrupted: {}", e)))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        if written > 0 {
            return Ok(Some(dest.to_path_buf()));
        }
    }

    Ok(None)
}
