//! Internal notification endpoints.

use axum::{extract::State, http::StatusCode};
use tracing::info;

use crate::state::AppState;

/// Broadcast a change made by another process (e.g. the CLI).
pub async fn notify(State(state): State<AppState>) -> StatusCode {
    info!(
        subscriber_count = state.notifier.subscriber_count(),
        "Received internal notification, broadcasting to streams"
    );
    state.notifier.notify_in_background();
    StatusCode::OK
}
