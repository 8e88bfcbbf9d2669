use axon_core::{run_blocking, RECENT_LOG_LIMIT};
use axum::extract::State;
use serde_json::json;

use super::{failure, ok, ApiResponse};
use crate::AppState;

/// GET /api/axon/logs: the most recent entries, newest first.
pub(crate) async fn list(State(state): State<AppState>) -> ApiResponse {
    let store = state.store.clone();
    match run_blocking(move || store.recent_logs(RECENT_LOG_LIMIT)).await {
        Ok(logs) => ok(json!({ "success": true, "logs": logs })),
        Err(e) => failure(e, "Failed to fetch logs"),
    }
}
