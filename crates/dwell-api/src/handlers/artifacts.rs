//! Processed artifact delivery.

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Annotated video from the last completed session.
pub async fn get_processed_video(
    State(state): State<AppState>,
    request: Request<Body>,
) -> ApiResult<Response> {
    let path = state
        .artifacts
        .existing_video()
        .await
        .map_err(|_| ApiError::not_found("No processed video found"))?;
    Ok(serve_file(path, request).await)
}

/// Snapshot from the last completed session.
pub async fn get_processed_snapshot(
    State(state): State<AppState>,
    request: Request<Body>,
) -> ApiResult<Response> {
    let path = state
        .artifacts
        .existing_snapshot()
        .await
        .map_err(|_| ApiError::not_found("No snapshot found"))?;
    Ok(serve_file(path, request).await)
}

/// Serve with content type from the extension and range support for seeking.
async fn serve_file(path: PathBuf, request: Request<Body>) -> Response {
    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    response.map(Body::new)
}

#[derive(Serialize)]
pub struct TunnelUrlResponse {
    pub ngrok_url: String,
}

/// Public tunnel URL, empty when none is configured.
pub async fn get_tunnel_url(State(state): State<AppState>) -> Json<TunnelUrlResponse> {
    Json(TunnelUrlResponse {
        ngrok_url: state.config.tunnel_url().await,
    })
}
