//! POST /api/nexus/sync

use axon_core::{run_blocking, SyncAction};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{bad_request, failure, json_rejection, ok, with_warning, ApiResponse};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SyncRequest {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    payload: Option<Value>,
}

/// Unknown actions answer 200 with `{success: false}` and leave the store untouched.
pub(crate) async fn sync(
    State(state): State<AppState>,
    body: Result<Json<SyncRequest>, JsonRejection>,
) -> ApiResponse {
    let Json(request) = match body {
        Ok(b) => b,
        Err(rejection) => return json_rejection(rejection),
    };
    let (Some(action), Some(payload)) = (
        request.action.filter(|a| !a.trim().is_empty()),
        request.payload.filter(Value::is_object),
    ) else {
        return bad_request("Action and payload are required");
    };

    let action = match SyncAction::parse(action.trim(), &payload) {
        Ok(a) => a,
        Err(e) => return failure(e, "Failed to handle Nexus sync"),
    };

    let logger = state.logger.clone();
    let handler = state.sync.clone();
    let result = run_blocking(move || {
        let warning = if action.is_known() {
            let name = action.action_name().to_string();
            logger.log_best_effort(
                "nexus",
                &format!("Received sync request: {}", name),
                &["nexus", "sync", name.as_str()],
            )
        } else {
            None
        };
        Ok((handler.sync(action)?, warning))
    })
    .await;

    match result {
        Ok((outcome, warning)) => {
            tracing::info!(target: "axon::routes", success = outcome.success, "{}", outcome.message);
            ok(with_warning(
                json!({ "success": outcome.success, "message": outcome.message }),
                warning,
            ))
        }
        Err(e) => failure(e, "Failed to handle Nexus sync"),
    }
}
