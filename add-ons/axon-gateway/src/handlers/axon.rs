//! Console endpoints: initialize, identity, process, and the aggregated state view.

use axon_core::run_blocking;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::{bad_request, failure, json_rejection, ok, with_warning, ApiResponse};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProcessRequest {
    #[serde(default)]
    message: Option<String>,
}

/// GET /api/axon/initialize: health check against the three tables, then an initialization log entry.
pub(crate) async fn initialize(State(state): State<AppState>) -> ApiResponse {
    let store = state.store.clone();
    let logger = state.logger.clone();
    let result = run_blocking(move || {
        store.health_check()?;
        Ok(logger.log_best_effort("system", "Axon initialized", &["system", "initialization"]))
    })
    .await;

    match result {
        Ok(warning) => {
            tracing::info!(target: "axon::routes", app = %state.config.app_name, "Axon initialized");
            ok(with_warning(
                json!({ "success": true, "message": "Axon initialized successfully" }),
                warning,
            ))
        }
        Err(e) => failure(e, "Failed to initialize Axon"),
    }
}

/// GET /api/axon/identity
pub(crate) async fn identity(State(state): State<AppState>) -> ApiResponse {
    match state.responder.identity_summary().await {
        Ok(message) => ok(json!({ "success": true, "message": message })),
        Err(e) => failure(e, "Failed to fetch Axon identity"),
    }
}

/// GET /api/axon/state: identity, mission, directives, and fragments as the prompt sees them.
pub(crate) async fn aggregated_state(State(state): State<AppState>) -> ApiResponse {
    let aggregator = state.aggregator.clone();
    match run_blocking(move || aggregator.get_state()).await {
        Ok(snapshot) => ok(json!({ "success": true, "state": snapshot })),
        Err(e) => failure(e, "Failed to fetch Axon state"),
    }
}

/// POST /api/axon/process
pub(crate) async fn process(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResponse {
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return json_rejection(rejection),
    };
    let Some(message) = request.message.filter(|m| !m.trim().is_empty()) else {
        return bad_request("Message is required");
    };

    match state.responder.respond(&message).await {
        Ok(response) => ok(json!({ "success": true, "response": response })),
        Err(e) => failure(e, "Failed to process message"),
    }
}
