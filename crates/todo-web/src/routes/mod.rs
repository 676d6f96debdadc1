//! Route handlers.

pub mod internal;
pub mod stream;
pub mod tasks;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use todo_core::TodoError;

/// Error response used by every handler.
pub type ApiError = (StatusCode, Json<Value>);

/// Map a core error onto a status code and `{ "error": ... }` body.
pub fn api_error(err: TodoError) -> ApiError {
    let status = match &err {
        TodoError::ValidationError(_) => StatusCode::BAD_REQUEST,
        TodoError::NotFound(_) => StatusCode::NOT_FOUND,
        TodoError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        TodoError::StreamWriteFailure(_) | TodoError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    }
    (status, Json(json!({ "error": err.to_string() })))
}

pub async fn index() -> Json<Value> {
    Json(json!({ "message": "crappy_todo_app api" }))
}
