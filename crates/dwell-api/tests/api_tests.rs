//! API integration tests.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use dwell_api::{create_router, ApiConfig, AppState, OracleProvider, SessionRunner};
use dwell_media::{
    ArtifactPaths, Frame, MediaResult, PipelineConfig, ProgressReporter, SessionOutput,
    TrackingOracle,
};
use dwell_models::{SessionId, SessionStatus, TrackedObject};

const BOUNDARY: &str = "dwell-test-boundary";

struct EmptyOracle;

#[async_trait]
impl TrackingOracle for EmptyOracle {
    async fn track(&mut self, _frame: &Frame, _persist: bool) -> MediaResult<Vec<TrackedObject>> {
        Ok(Vec::new())
    }
}

struct StubProvider {
    ready: bool,
}

#[async_trait]
impl OracleProvider for StubProvider {
    fn open_session(&self, _session_id: &SessionId) -> Box<dyn TrackingOracle> {
        Box::new(EmptyOracle)
    }

    async fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Publishes progress for a fixed number of frames and reports a fixed result.
struct ScriptedRunner {
    frames: u64,
    frame_delay: Duration,
    violations: usize,
    snapshot: bool,
}

impl ScriptedRunner {
    fn instant(violations: usize, snapshot: bool) -> Self {
        Self {
            frames: 3,
            frame_delay: Duration::ZERO,
            violations,
            snapshot,
        }
    }
}

#[async_trait]
impl SessionRunner for ScriptedRunner {
    async fn run_session(
        &self,
        _session_id: &SessionId,
        input: &Path,
        _oracle: &mut dyn TrackingOracle,
        progress: &ProgressReporter,
        artifacts: &ArtifactPaths,
    ) -> MediaResult<SessionOutput> {
        assert!(input.exists());
        progress.reset(self.frames);
        for frame in 1..=self.frames {
            tokio::time::sleep(self.frame_delay).await;
            progress.advance(frame);
        }
        progress.complete();

        Ok(SessionOutput {
            violation_count: self.violations,
            video_path: artifacts.video.clone(),
            snapshot_path: self.snapshot.then(|| artifacts.snapshot.clone()),
            frames_processed: self.frames,
        })
    }
}

fn test_config(dir: &TempDir) -> ApiConfig {
    ApiConfig {
        upload_dir: dir.path().join("uploads"),
        processed_dir: dir.path().join("processed"),
        ngrok_config_path: dir.path().join("ngrok_config.json"),
        ..ApiConfig::default()
    }
}

fn runner_state(dir: &TempDir, runner: ScriptedRunner) -> AppState {
    AppState::with_runner(
        test_config(dir),
        Arc::new(runner),
        Arc::new(StubProvider { ready: true }),
    )
}

fn test_state(dir: &TempDir, tracker_ready: bool) -> AppState {
    AppState::with_oracle(
        test_config(dir),
        PipelineConfig::default(),
        Arc::new(StubProvider {
            ready: tracker_ready,
        }),
    )
}

fn create_test_router(state: AppState) -> Router {
    create_router(state, None)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_upload(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: video/mp4\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Test health endpoint.
#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = create_test_router(test_state(&dir, true));

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_unhealthy_tracker() {
    let dir = TempDir::new().unwrap();
    let app = create_test_router(test_state(&dir, false));

    let response = app.oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["checks"]["tracker"]["status"], "error");
}

#[tokio::test]
async fn test_progress_is_idle_before_any_upload() {
    let dir = TempDir::new().unwrap();
    let app = create_test_router(test_state(&dir, true));

    let response = app.oneshot(get("/progress")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "idle");
    assert_eq!(body["progress"], 0.0);
    assert_eq!(body["current_frame"], 0);
    assert_eq!(body["total_frames"], 0);
}

#[tokio::test]
async fn test_missing_artifacts_return_404() {
    let dir = TempDir::new().unwrap();
    let app = create_test_router(test_state(&dir, true));

    let response = app
        .clone()
        .oneshot(get("/processed_video_file"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "No processed video found");

    let response = app.oneshot(get("/processed_snapshot")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "No snapshot found");
}

#[tokio::test]
async fn test_snapshot_served_with_cross_origin_headers() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir, true);
    let processed = dir.path().join("processed");
    std::fs::create_dir_all(&processed).unwrap();
    std::fs::write(processed.join("snapshot.jpg"), b"\xff\xd8\xff\xd9").unwrap();

    let app = create_test_router(state);
    let response = app.oneshot(get("/processed_snapshot")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers["cross-origin-resource-policy"], "cross-origin");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"\xff\xd8\xff\xd9");
}

#[tokio::test]
async fn test_upload_without_video_field_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir, true);
    let app = create_test_router(state.clone());

    let response = app
        .oneshot(multipart_upload("document", "notes.txt", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No video file provided");
    // Rejected uploads leave the progress state untouched
    assert_eq!(state.progress.snapshot().status.as_str(), "idle");
}

#[tokio::test]
async fn test_upload_with_empty_video_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = create_test_router(test_state(&dir, true));

    let response = app
        .oneshot(multipart_upload("video", "", b""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_while_busy_returns_conflict() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir, true);
    let _running = state.try_begin_session().unwrap();
    let app = create_test_router(state);

    let response = app
        .oneshot(multipart_upload("video", "clip.mp4", b"not really a video"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(json_body(response).await["error"]
        .as_str()
        .unwrap()
        .contains("already being processed"));
}

#[tokio::test]
async fn test_undecodable_upload_fails_session() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir, true);
    let app = create_test_router(state.clone());

    let response = app
        .oneshot(multipart_upload("file", "clip.mp4", b"not really a video"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(response).await["error"].is_string());
    assert_eq!(state.progress.snapshot().status.as_str(), "error");
    assert!(dir.path().join("uploads").join("input.mp4").exists());

    // The slot is free again once the request returns
    assert!(state.try_begin_session().is_some());
}

#[tokio::test]
async fn test_successful_upload_returns_summary() {
    let dir = TempDir::new().unwrap();
    let state = runner_state(&dir, ScriptedRunner::instant(3, true));
    let app = create_test_router(state.clone());

    let response = app
        .oneshot(multipart_upload("video", "clip.mp4", b"frames"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["tracked_objects"], 3);
    assert_eq!(
        body["video_url"],
        "http://localhost:5000/processed_video_file"
    );
    assert_eq!(
        body["snapshot_url"],
        "http://localhost:5000/processed_snapshot"
    );
    assert_eq!(state.progress.snapshot().status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_summary_without_snapshot_uses_tunnel_url() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("ngrok_config.json"),
        r#"{"ngrok_url": "https://abc.ngrok.io/"}"#,
    )
    .unwrap();
    let app = create_test_router(runner_state(&dir, ScriptedRunner::instant(0, false)));

    let response = app
        .oneshot(multipart_upload("file", "clip.mp4", b"frames"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["tracked_objects"], 0);
    assert_eq!(body["video_url"], "https://abc.ngrok.io/processed_video_file");
    assert!(body["snapshot_url"].is_null());
}

#[tokio::test]
async fn test_session_finishes_after_client_disconnects() {
    let dir = TempDir::new().unwrap();
    let state = runner_state(
        &dir,
        ScriptedRunner {
            frames: 10,
            frame_delay: Duration::from_millis(50),
            violations: 1,
            snapshot: true,
        },
    );
    let app = create_test_router(state.clone());

    // Drop the request future while the session is mid-run
    let request = app.oneshot(multipart_upload("video", "clip.mp4", b"frames"));
    assert!(tokio::time::timeout(Duration::from_millis(150), request)
        .await
        .is_err());
    assert_eq!(state.progress.snapshot().status, SessionStatus::Processing);

    let mut waited = Duration::ZERO;
    while !state.progress.snapshot().is_terminal() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }

    let final_state = state.progress.snapshot();
    assert_eq!(final_state.status, SessionStatus::Completed);
    assert_eq!(final_state.current_frame, 10);
    // The slot is released with the task, not with the request
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(state.try_begin_session().is_some());
}

#[tokio::test]
async fn test_tunnel_url_empty_without_config() {
    let dir = TempDir::new().unwrap();
    let app = create_test_router(test_state(&dir, true));

    let response = app.oneshot(get("/ngrok-url")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ngrok_url"], "");
}

#[tokio::test]
async fn test_tunnel_url_trims_trailing_slash() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("ngrok_config.json"),
        r#"{"ngrok_url": "https://abc.ngrok.io/"}"#,
    )
    .unwrap();
    let app = create_test_router(test_state(&dir, true));

    let response = app.oneshot(get("/ngrok-url")).await.unwrap();

    assert_eq!(
        json_body(response).await["ngrok_url"],
        "https://abc.ngrok.io"
    );
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let dir = TempDir::new().unwrap();
    let app = create_test_router(test_state(&dir, true));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let dir = TempDir::new().unwrap();
    let app = create_test_router(test_state(&dir, true));

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
