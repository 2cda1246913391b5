//! Board-keyed publish/subscribe fan-out.
//!
//! DESIGN
//! ======
//! The registry maps board id to the senders of every open subscription on
//! that board. `publish` holds the read lock only while it `try_send`s, so
//! it never waits on a slow reader: a full buffer drops the event for that
//! one subscriber. `subscribe` and cancellation take the write lock for the
//! map mutation alone.
//!
//! Cancelling removes the sender from the registry, which drops it and
//! closes the channel. A sender is therefore never reachable by `publish`
//! once its cancellation has returned.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::mpsc;

use super::Event;

pub const DEFAULT_CAPACITY: usize = 16;

type Registry = HashMap<i64, HashMap<u64, mpsc::Sender<Arc<str>>>>;

struct BusInner {
    subscribers: RwLock<Registry>,
    next_id: AtomicU64,
    capacity: usize,
}

impl BusInner {
    fn remove(&self, board_id: i64, id: u64) -> bool {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(board) = subscribers.get_mut(&board_id) else {
            return false;
        };
        let removed = board.remove(&id).is_some();
        if board.is_empty() {
            subscribers.remove(&board_id);
        }
        removed
    }
}

/// Cheap to clone; all clones share one registry.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "subscriber capacity must be positive");
        Self {
            inner: Arc::new(BusInner {
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                capacity,
            }),
        }
    }

    /// Register a new bounded subscription for `board_id`.
    #[must_use]
    pub fn subscribe(&self, board_id: i64) -> Subscription {
        let (tx, rx) = mpsc::channel(self.inner.capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut subscribers = self.inner.subscribers.write().unwrap_or_else(PoisonError::into_inner);
            subscribers.entry(board_id).or_default().insert(id, tx);
        }
        tracing::debug!(%board_id, subscription = id, "subscribed");
        Subscription { rx, handle: SubscriptionHandle { bus: Arc::downgrade(&self.inner), board_id, id } }
    }

    /// Fan `event` out to every subscriber of its board.
    ///
    /// Returns the number of subscribers that accepted it. Never blocks and
    /// never fails; full buffers drop the event for that subscriber only.
    pub fn publish(&self, event: &Event) -> usize {
        let payload: Arc<str> = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(e) => {
                tracing::warn!(error = %e, kind = %event.kind, "event serialization failed");
                return 0;
            }
        };

        let subscribers = self.inner.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        let Some(board) = subscribers.get(&event.board_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (id, tx) in board {
            match tx.try_send(Arc::clone(&payload)) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!(board_id = event.board_id, subscription = id, kind = %event.kind, "subscriber full; event dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }

    /// Number of live subscriptions for `board_id`.
    #[must_use]
    pub fn subscriber_count(&self, board_id: i64) -> usize {
        let subscribers = self.inner.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        subscribers.get(&board_id).map_or(0, HashMap::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("capacity", &self.inner.capacity).finish_non_exhaustive()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Deregisters one subscription. Clones refer to the same entry.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    bus: Weak<BusInner>,
    board_id: i64,
    id: u64,
}

impl SubscriptionHandle {
    /// Remove the subscription and close its channel. Idempotent.
    pub fn cancel(&self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        if bus.remove(self.board_id, self.id) {
            tracing::debug!(board_id = self.board_id, subscription = self.id, "unsubscribed");
        }
    }
}

/// The read end of one subscription. Dropping it cancels the subscription.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<Arc<str>>,
    handle: SubscriptionHandle,
}

impl Subscription {
    #[must_use]
    pub fn board_id(&self) -> i64 {
        self.handle.board_id
    }

    #[must_use]
    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    /// Next serialized event, or `None` once the subscription is cancelled
    /// and its buffer drained.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.rx.recv().await
    }

    #[cfg(test)]
    pub fn try_recv(&mut self) -> Result<Arc<str>, mpsc::error::TryRecvError> {
        self.rx.try_recv()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

#[cfg(test)]
#[path = "bus_test.rs"]
mod tests;
