//! Per-connection task stream.

use tokio::sync::watch;
use tracing::debug;

use crate::error::{TodoError, TodoResult};
use crate::notifier::{ChangeNotifier, Snapshot, Subscription};
use crate::task::model::TaskList;

/// Lifecycle of a streaming connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Connecting,
    Subscribed,
    Closed,
}

/// Store `snapshot` in the slot unless the slot already holds a newer one.
fn offer(slot: &watch::Sender<Option<Snapshot>>, snapshot: &Snapshot) -> TodoResult<()> {
    if slot.is_closed() {
        return Err(TodoError::stream_write("stream receiver closed"));
    }
    slot.send_if_modified(|current| match current {
        Some(held) if held.generation >= snapshot.generation => false,
        _ => {
            *current = Some(snapshot.clone());
            true
        }
    });
    Ok(())
}

/// A live feed of task list snapshots for one client.
///
/// Frames come from a single latest-snapshot slot: a reader that falls behind
/// skips straight to the newest list, and a list read earlier never replaces
/// one read later. The first frame is at least as new as the moment of
/// opening. Dropping the stream releases its subscription.
pub struct TaskStream {
    state: StreamState,
    subscription: Option<Subscription>,
    rx: watch::Receiver<Option<Snapshot>>,
}

impl TaskStream {
    /// Subscribe to `notifier` and publish the initial snapshot.
    pub async fn open(notifier: &ChangeNotifier) -> TodoResult<Self> {
        let (tx, rx) = watch::channel(None);
        let mut stream = Self {
            state: StreamState::Connecting,
            subscription: None,
            rx,
        };

        let slot = tx.clone();
        stream.subscription = Some(notifier.subscribe(move |snapshot: &Snapshot| offer(&slot, snapshot)));

        // Broadcasts that land during this read carry a later generation and win.
        // On error the subscription is released when `stream` drops.
        let initial = notifier.read_snapshot().await?;
        offer(&tx, &initial)?;

        stream.state = StreamState::Subscribed;
        debug!(subscriber_id = ?stream.subscriber_id(), "Task stream opened");
        Ok(stream)
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn subscriber_id(&self) -> Option<u64> {
        self.subscription.as_ref().map(Subscription::id)
    }

    /// Wait for the next snapshot. Returns `None` once the stream is closed.
    pub async fn next_frame(&mut self) -> Option<TaskList> {
        loop {
            if self.state == StreamState::Closed {
                return None;
            }
            self.rx.changed().await.ok()?;
            if let Some(snapshot) = self.rx.borrow_and_update().as_ref() {
                return Some(snapshot.list.clone());
            }
        }
    }

    /// Release the subscription. No frames are yielded afterwards.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            debug!(subscriber_id = subscription.id(), "Task stream closed");
        }
        self.state = StreamState::Closed;
    }
}

impl Drop for TaskStream {
    fn drop(&mut self) {
        self.close();
    }
}
