//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Install the Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "dwell_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "dwell_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "dwell_http_requests_in_flight";
    pub const UPLOADS_REJECTED_TOTAL: &str = "dwell_uploads_rejected_total";
}

/// Paths with their own label; everything else is grouped.
const KNOWN_PATHS: &[&str] = &[
    "/upload",
    "/progress",
    "/processed_video_file",
    "/processed_snapshot",
    "/ngrok-url",
    "/health",
    "/ready",
    "/metrics",
];

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", normalize_path(path).to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an upload turned away. `reason` is `busy` or `no_file`.
pub fn record_upload_rejected(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::UPLOADS_REJECTED_TOTAL, &labels).increment(1);
}

fn normalize_path(path: &str) -> &str {
    KNOWN_PATHS
        .iter()
        .find(|known| **known == path)
        .copied()
        .unwrap_or("other")
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    record_http_request(&method, &path, status, start.elapsed().as_secs_f64());

    response
}
