//! /api/axon/directives

use axon_core::{run_blocking, DirectiveInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use super::{failure, json_rejection, ok, with_warning, ApiResponse};
use crate::AppState;

/// GET: all directives, highest priority first.
pub(crate) async fn list(State(state): State<AppState>) -> ApiResponse {
    let store = state.store.clone();
    match run_blocking(move || store.list_directives()).await {
        Ok(directives) => ok(json!({ "success": true, "directives": directives })),
        Err(e) => failure(e, "Failed to fetch directives"),
    }
}

pub(crate) async fn create(
    State(state): State<AppState>,
    body: Result<Json<DirectiveInput>, JsonRejection>,
) -> ApiResponse {
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => return json_rejection(rejection),
    };
    let draft = match input.validate() {
        Ok(d) => d,
        Err(e) => return failure(e, "Failed to create directive"),
    };

    let store = state.store.clone();
    let logger = state.logger.clone();
    let result = run_blocking(move || {
        let directive = store.insert_directive(&draft)?;
        let warning = logger.log_best_effort(
            "system",
            &format!("Created new directive: {}", directive.name),
            &["system", "directive", "create"],
        );
        Ok((directive, warning))
    })
    .await;

    match result {
        Ok((directive, warning)) => ok(with_warning(
            json!({ "success": true, "directive": directive }),
            warning,
        )),
        Err(e) => failure(e, "Failed to create directive"),
    }
}

/// PUT: full overwrite of name, description, priority, and tags.
pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<DirectiveInput>, JsonRejection>,
) -> ApiResponse {
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => return json_rejection(rejection),
    };
    let draft = match input.validate() {
        Ok(d) => d,
        Err(e) => return failure(e, "Failed to update directive"),
    };

    let store = state.store.clone();
    let logger = state.logger.clone();
    let result = run_blocking(move || {
        let directive = store.update_directive(&id, &draft)?;
        let warning = logger.log_best_effort(
            "system",
            &format!("Updated directive: {}", directive.name),
            &["system", "directive", "update"],
        );
        Ok((directive, warning))
    })
    .await;

    match result {
        Ok((directive, warning)) => ok(with_warning(
            json!({ "success": true, "directive": directive }),
            warning,
        )),
        Err(e) => failure(e, "Failed to update directive"),
    }
}

pub(crate) async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    let store = state.store.clone();
    let logger = state.logger.clone();
    let result = run_blocking(move || {
        let name = store.delete_directive(&id)?;
        Ok(logger.log_best_effort(
            "system",
            &format!("Deleted directive: {}", name),
            &["system", "directive", "delete"],
        ))
    })
    .await;

    match result {
        Ok(warning) => ok(with_warning(json!({ "success": true }), warning)),
        Err(e) => failure(e, "Failed to delete directive"),
    }
}
