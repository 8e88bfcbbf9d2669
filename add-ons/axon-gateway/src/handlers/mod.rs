//! Route handlers. Every handler answers with `(StatusCode, Json<Value>)` and the
//! `{success, ...}` envelope; only validation messages reach the caller verbatim.

pub(crate) mod axon;
pub(crate) mod directives;
pub(crate) mod fragments;
pub(crate) mod logs;
pub(crate) mod nexus;

use axon_core::AxonError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub(crate) type ApiResponse = (StatusCode, Json<Value>);

pub(crate) fn ok(body: Value) -> ApiResponse {
    (StatusCode::OK, Json(body))
}

/// Attach a `warning` field when a best-effort side effect failed.
pub(crate) fn with_warning(mut body: Value, warning: Option<String>) -> Value {
    if let (Some(w), Some(obj)) = (warning, body.as_object_mut()) {
        obj.insert("warning".to_string(), Value::String(w));
    }
    body
}

pub(crate) fn bad_request(message: &str) -> ApiResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message })),
    )
}

/// Map a core error to the envelope. Non-validation detail stays in the server log.
pub(crate) fn failure(err: AxonError, generic: &str) -> ApiResponse {
    match err {
        AxonError::Validation(message) => bad_request(&message),
        other => {
            tracing::error!(target: "axon::routes", error = %other, "{}", generic);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": generic })),
            )
        }
    }
}

pub(crate) fn json_rejection(rejection: JsonRejection) -> ApiResponse {
    tracing::debug!(target: "axon::routes", error = %rejection, "Rejected request body");
    bad_request(&format!("Invalid JSON body: {}", rejection.body_text()))
}
