//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    get_processed_snapshot, get_processed_video, get_progress, get_tunnel_url, health, ready,
    upload_video,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    artifact_headers, cors_layer, request_id, request_logging, security_headers,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let processing_routes = Router::new()
        // Multipart extraction has its own, much smaller default cap
        .route(
            "/upload",
            post(upload_video).layer(DefaultBodyLimit::max(state.config.max_body_size)),
        )
        .route("/progress", get(get_progress))
        .route("/ngrok-url", get(get_tunnel_url));

    // Loaded by <video>/<img> elements on other origins
    let artifact_routes = Router::new()
        .route("/processed_video_file", get(get_processed_video))
        .route("/processed_snapshot", get(get_processed_snapshot))
        .layer(middleware::from_fn(artifact_headers));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(processing_routes)
        .merge(artifact_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
