//! Progress polling.

use axum::extract::State;
use axum::Json;

use dwell_models::SessionState;

use crate::state::AppState;

/// Latest progress snapshot. Never fails.
pub async fn get_progress(State(state): State<AppState>) -> Json<SessionState> {
    Json(state.progress.snapshot())
}
