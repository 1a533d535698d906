use crate::hub::{SubscriberId, SubscriberSet};
use crate::position::PositionUpdate;
use crate::state::store::PositionStore;
use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::debug;

/// Default per-subscriber delivery buffer
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Tracker engine: the single owner of all mutable state.
///
/// The store and the subscriber set live under one lock so that recording an
/// update and fanning it out is atomic relative to a concurrent attach. A
/// subscriber therefore sees the current latest exactly once, then every later
/// update in acceptance order, with no gap and no duplicate.
pub struct TrackerEngine {
    inner: Mutex<EngineInner>,
    channel_capacity: usize,
}

struct EngineInner {
    store: PositionStore,
    subscribers: SubscriberSet,
}

impl TrackerEngine {
    pub fn new(history_capacity: usize) -> Self {
        Self::with_channel_capacity(history_capacity, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_channel_capacity(history_capacity: usize, channel_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(EngineInner {
                store: PositionStore::new(history_capacity),
                subscribers: SubscriberSet::new(),
            }),
            // mpsc channels require a capacity of at least 1
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Accept an already-validated update: record it and push it to every live
    /// subscriber in one critical section.
    pub fn accept(&self, update: PositionUpdate) {
        let mut inner = self.lock();
        inner.store.record(update.clone());
        let delivered = inner.subscribers.publish(&update);
        debug!(
            delivered,
            history = inner.store.len(),
            "Accepted position update"
        );
    }

    pub fn latest(&self) -> Option<PositionUpdate> {
        self.lock().store.latest().cloned()
    }

    /// Snapshot of the bounded history, oldest first
    pub fn history(&self) -> Vec<PositionUpdate> {
        self.lock().store.history()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Attach a new live subscriber.
    ///
    /// The current latest (if any) is loaded into the subscription channel
    /// before the sender joins the live set, so the subscriber never misses
    /// the current state and never sees it twice.
    pub fn attach(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::channel(self.channel_capacity);

        let mut inner = self.lock();
        if let Some(latest) = inner.store.latest() {
            // Fresh channel with capacity >= 1: this send cannot fail
            let _ = tx.try_send(latest.clone());
        }
        let id = inner.subscribers.attach(tx);
        drop(inner);

        Subscription {
            id,
            rx,
            engine: Arc::downgrade(self),
        }
    }

    /// Idempotent detach; safe to call from the connection-close path and the
    /// publish-failure path concurrently.
    pub fn detach(&self, id: SubscriberId) {
        self.lock().subscribers.detach(id);
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap()
    }
}

/// A live subscription handle returned by attach.
///
/// Streams accepted updates in acceptance order and detaches itself from the
/// engine when dropped. The hub detaches on send failure independently; the
/// two paths may race without double-processing.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<PositionUpdate>,
    engine: Weak<TrackerEngine>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receive the next update; None once detached and drained
    pub async fn recv(&mut self) -> Option<PositionUpdate> {
        self.rx.recv().await
    }

    /// Non-blocking receive
    pub fn try_recv(&mut self) -> Option<PositionUpdate> {
        self.rx.try_recv().ok()
    }
}

impl Stream for Subscription {
    type Item = PositionUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.upgrade() {
            engine.detach(self.id);
        }
    }
}
