//! Centralized error types for the todo service.

use thiserror::Error;

/// Main error type for todo operations.
#[derive(Error, Debug)]
pub enum TodoError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Task store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Stream write failed: {0}")]
    StreamWriteFailure(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for todo operations.
pub type TodoResult<T> = Result<T, TodoError>;

impl TodoError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a stream write failure.
    pub fn stream_write(msg: impl Into<String>) -> Self {
        Self::StreamWriteFailure(msg.into())
    }
}

impl From<todo_redis::RedisError> for TodoError {
    fn from(err: todo_redis::RedisError) -> Self {
        match err {
            todo_redis::RedisError::Serialization(e) => Self::Json(e),
            todo_redis::RedisError::Connection(e) => Self::StoreUnavailable(e.to_string()),
        }
    }
}
