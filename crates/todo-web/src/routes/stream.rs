//! Server-Sent Events stream of task list snapshots.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use todo_core::TaskStream;
use tracing::{info, warn};

use super::{api_error, ApiError};
use crate::state::AppState;

/// Handle a task subscription (GET /tasksSub).
///
/// Every frame is `data: {"tasks":[...]}`. The first one is sent on open, then
/// one per change. When the client goes away axum drops the body stream,
/// which drops the [`TaskStream`] and releases its subscription.
pub async fn subscribe_tasks(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let task_stream = TaskStream::open(&state.notifier).await.map_err(api_error)?;
    info!(subscriber_id = ?task_stream.subscriber_id(), "Task stream client connected");

    let events = stream::unfold(task_stream, |mut task_stream| async move {
        loop {
            let frame = task_stream.next_frame().await?;
            match Event::default().json_data(&frame) {
                Ok(event) => return Some((Ok::<_, Infallible>(event), task_stream)),
                Err(e) => {
                    warn!(error = %e, "Failed to serialize task frame");
                    continue;
                }
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
