//! /api/axon/symbolic-fragments

use axon_core::{run_blocking, FragmentInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use super::{failure, json_rejection, ok, with_warning, ApiResponse};
use crate::AppState;

/// GET: newest fragments first.
pub(crate) async fn list(State(state): State<AppState>) -> ApiResponse {
    let store = state.store.clone();
    match run_blocking(move || store.list_fragments()).await {
        Ok(fragments) => ok(json!({ "success": true, "fragments": fragments })),
        Err(e) => failure(e, "Failed to fetch symbolic fragments"),
    }
}

pub(crate) async fn create(
    State(state): State<AppState>,
    body: Result<Json<FragmentInput>, JsonRejection>,
) -> ApiResponse {
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => return json_rejection(rejection),
    };
    let draft = match input.validate() {
        Ok(d) => d,
        Err(e) => return failure(e, "Failed to create symbolic fragment"),
    };

    let store = state.store.clone();
    let logger = state.logger.clone();
    let result = run_blocking(move || {
        let fragment = store.insert_fragment(&draft)?;
        let warning = logger.log_best_effort(
            "system",
            &format!("Created new symbolic fragment: {}", fragment.key),
            &["system", "symbolic", "create"],
        );
        Ok((fragment, warning))
    })
    .await;

    match result {
        Ok((fragment, warning)) => ok(with_warning(
            json!({ "success": true, "fragment": fragment }),
            warning,
        )),
        Err(e) => failure(e, "Failed to create symbolic fragment"),
    }
}

/// PUT: a missing id is a store error (500), not a silent no-op.
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<FragmentInput>, JsonRejection>,
) -> ApiResponse {
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => return json_rejection(rejection),
    };
    let draft = match input.validate() {
        Ok(d) => d,
        Err(e) => return failure(e, "Failed to update symbolic fragment"),
    };

    let store = state.store.clone();
    let logger = state.logger.clone();
    let result = run_blocking(move || {
        let fragment = store.update_fragment(&id, &draft)?;
        let warning = logger.log_best_effort(
            "system",
            &format!("Updated symbolic fragment: {}", fragment.key),
            &["system", "symbolic", "update"],
        );
        Ok((fragment, warning))
    })
    .await;

    match result {
        Ok((fragment, warning)) => ok(with_warning(
            json!({ "success": true, "fragment": fragment }),
            warning,
        )),
        Err(e) => failure(e, "Failed to update symbolic fragment"),
    }
}

pub(crate) async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    let store = state.store.clone();
    let logger = state.logger.clone();
    let result = run_blocking(move || {
        let key = store.delete_fragment(&id)?;
        Ok(logger.log_best_effort(
            "system",
            &format!("Deleted symbolic fragment: {}", key),
            &["system", "symbolic", "delete"],
        ))
    })
    .await;

    match result {
        Ok(warning) => ok(with_warning(json!({ "success": true }), warning)),
        Err(e) => failure(e, "Failed to delete symbolic fragment"),
    }
}
