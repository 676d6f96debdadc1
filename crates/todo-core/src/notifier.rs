//! In-process change notifier for live task list updates.
//!
//! Mutation handlers call [`ChangeNotifier::notify_changed`] after a write has
//! been confirmed. Every registered subscriber then receives a freshly read
//! task list. Subscribers are removed through their [`Subscription`] guard or
//! automatically after a failed push.
//!
//! Broadcasts may overlap, so pushes can arrive out of order. Each snapshot
//! carries the generation taken just before its read; a subscriber keeps a
//! snapshot only if its generation is newer than the one it already holds.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, info, warn};

use crate::error::TodoResult;
use crate::task::model::TaskList;
use crate::task::TaskGateway;

/// A task list read together with the generation issued before the read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub generation: u64,
    pub list: TaskList,
}

type PushFn = dyn Fn(&Snapshot) -> TodoResult<()> + Send + Sync;

#[derive(Default)]
struct Registry {
    next_id: u64,
    // Ids are handed out in increasing order, so iteration follows registration order.
    subscribers: BTreeMap<u64, Arc<PushFn>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fans "task list changed" out to every open stream.
///
/// Construct once per server and share clones between the mutation handlers
/// and the streaming handlers.
#[derive(Clone)]
pub struct ChangeNotifier {
    gateway: TaskGateway,
    registry: Arc<Mutex<Registry>>,
    generation: Arc<AtomicU64>,
}

impl ChangeNotifier {
    pub fn new(gateway: TaskGateway) -> Self {
        Self {
            gateway,
            registry: Arc::new(Mutex::new(Registry::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The gateway subscribers are refreshed from.
    pub fn gateway(&self) -> &TaskGateway {
        &self.gateway
    }

    /// Issue a generation for a read that is about to start. Never returns 0.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Read the task list stamped with a fresh generation.
    pub async fn read_snapshot(&self) -> TodoResult<Snapshot> {
        let generation = self.next_generation();
        let tasks = self.gateway.list().await?;
        Ok(Snapshot {
            generation,
            list: TaskList { tasks },
        })
    }

    /// Register `push` to receive a snapshot on every change.
    ///
    /// The returned guard deregisters the callback when dropped.
    pub fn subscribe<F>(&self, push: F) -> Subscription
    where
        F: Fn(&Snapshot) -> TodoResult<()> + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.insert(id, Arc::new(push));
        info!(subscriber_id = id, subscriber_count = registry.subscribers.len(), "Stream subscribed");

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }

    /// Push the current task list to every subscriber, in registration order.
    ///
    /// Each subscriber gets its own re-read of the list. A subscriber whose
    /// push fails is deregistered and the broadcast continues. Returns the
    /// number of successful pushes.
    pub async fn notify_changed(&self) -> usize {
        let subscribers: Vec<(u64, Arc<PushFn>)> = lock(&self.registry)
            .subscribers
            .iter()
            .map(|(id, push)| (*id, Arc::clone(push)))
            .collect();

        if subscribers.is_empty() {
            debug!("Change notification with no subscribers");
            return 0;
        }

        let mut delivered = 0;
        for (id, push) in subscribers {
            let snapshot = match self.read_snapshot().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(subscriber_id = id, error = %e, "Failed to refresh task list for subscriber");
                    continue;
                }
            };

            // Skip streams closed while the list was being read.
            if !lock(&self.registry).subscribers.contains_key(&id) {
                continue;
            }

            match push(&snapshot) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(subscriber_id = id, error = %e, "Push failed, dropping subscriber");
                    lock(&self.registry).subscribers.remove(&id);
                }
            }
        }

        debug!(delivered, "Change notification delivered");
        delivered
    }

    /// Run [`notify_changed`](Self::notify_changed) on a spawned task.
    ///
    /// The caller neither waits for nor observes the outcome.
    pub fn notify_in_background(&self) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify_changed().await;
        });
    }
}

/// Registration handle returned by [`ChangeNotifier::subscribe`].
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Deregister the callback. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if registry.subscribers.remove(&self.id).is_some() {
            info!(
                subscriber_id = self.id,
                subscriber_count = registry.subscribers.len(),
                "Stream unsubscribed"
            );
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TodoError;
    use crate::task::collection::MemoryCollection;

    fn notifier() -> ChangeNotifier {
        ChangeNotifier::new(TaskGateway::new(Arc::new(MemoryCollection::new())))
    }

    /// Subscribe a callback that records every pushed list.
    fn recorder(notifier: &ChangeNotifier) -> (Subscription, Arc<Mutex<Vec<TaskList>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = notifier.subscribe(move |snapshot| {
            sink.lock().unwrap().push(snapshot.list.clone());
            Ok(())
        });
        (sub, seen)
    }

    #[tokio::test]
    async fn test_notify_without_subscribers() {
        let notifier = notifier();
        assert_eq!(notifier.notify_changed().await, 0);
    }

    #[tokio::test]
    async fn test_each_subscriber_gets_one_push() {
        let notifier = notifier();
        let subs: Vec<_> = (0..3).map(|_| recorder(&notifier)).collect();

        let id = notifier.gateway().create("Buy milk", "2%").await.unwrap();
        assert_eq!(notifier.notify_changed().await, 3);

        for (_, seen) in &subs {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].tasks.len(), 1);
            assert_eq!(seen[0].tasks[0].id, id);
        }
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_pushes() {
        let notifier = notifier();
        let (sub, seen) = recorder(&notifier);
        let (_other, other_seen) = recorder(&notifier);

        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(notifier.subscriber_count(), 1);

        assert_eq!(notifier.notify_changed().await, 1);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(other_seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_deregisters() {
        let notifier = notifier();
        {
            let _sub = recorder(&notifier);
            assert_eq!(notifier.subscriber_count(), 1);
        }
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_after_notifier_dropped() {
        let notifier = notifier();
        let (sub, _seen) = recorder(&notifier);
        drop(notifier);
        sub.unsubscribe();
    }

    #[tokio::test]
    async fn test_failing_subscriber_is_isolated_and_removed() {
        let notifier = notifier();
        let (_first, first_seen) = recorder(&notifier);
        let _broken = notifier.subscribe(|_| Err(TodoError::stream_write("socket closed")));
        let (_last, last_seen) = recorder(&notifier);

        assert_eq!(notifier.notify_changed().await, 2);
        assert_eq!(notifier.subscriber_count(), 2);
        assert_eq!(first_seen.lock().unwrap().len(), 1);
        assert_eq!(last_seen.lock().unwrap().len(), 1);

        assert_eq!(notifier.notify_changed().await, 2);
    }

    #[tokio::test]
    async fn test_generations_increase_per_read() {
        let notifier = notifier();
        let generations = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&generations);
        let _sub = notifier.subscribe(move |snapshot| {
            sink.lock().unwrap().push(snapshot.generation);
            Ok(())
        });

        let first = notifier.read_snapshot().await.unwrap().generation;
        notifier.notify_changed().await;
        notifier.notify_changed().await;

        let seen = generations.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert!(first > 0);
        assert!(first < seen[0] && seen[0] < seen[1]);
    }

    #[tokio::test]
    async fn test_pushes_follow_registration_order() {
        let notifier = notifier();
        let order = Arc::new(Mutex::new(Vec::new()));
        let subs: Vec<Subscription> = (0..4)
            .map(|i| {
                let order = Arc::clone(&order);
                notifier.subscribe(move |_| {
                    order.lock().unwrap().push(i);
                    Ok(())
                })
            })
            .collect();

        notifier.notify_changed().await;
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
        drop(subs);
    }
}
