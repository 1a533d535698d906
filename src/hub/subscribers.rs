use crate::position::PositionUpdate;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Opaque identifier for an attached subscriber (UUIDv7, attachment-ordered)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct SubscriberHandle {
    tx: mpsc::Sender<PositionUpdate>,
    attached_at: DateTime<Utc>,
}

/// The set of live subscriber channels.
///
/// Delivery is strictly non-blocking: a subscriber whose channel is closed or
/// full is detached on the spot and never stalls delivery to the others. A
/// delivery failure is reported only as a detachment, never to the publisher.
#[derive(Default)]
pub struct SubscriberSet {
    subscribers: HashMap<SubscriberId, SubscriberHandle>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Register a send handle; returns the id used for detachment
    pub fn attach(&mut self, tx: mpsc::Sender<PositionUpdate>) -> SubscriberId {
        let id = SubscriberId::new();
        self.subscribers.insert(
            id,
            SubscriberHandle {
                tx,
                attached_at: Utc::now(),
            },
        );
        debug!(subscriber_id = %id, total = self.subscribers.len(), "Subscriber attached");
        id
    }

    /// Remove a subscriber. Unknown or already-detached ids are a no-op.
    pub fn detach(&mut self, id: SubscriberId) -> bool {
        match self.subscribers.remove(&id) {
            Some(handle) => {
                debug!(
                    subscriber_id = %id,
                    attached_at = %handle.attached_at,
                    total = self.subscribers.len(),
                    "Subscriber detached"
                );
                true
            }
            None => false,
        }
    }

    /// Push an update to every live subscriber.
    ///
    /// Subscribers whose channel is closed or full are detached. Returns the
    /// number of successful deliveries.
    pub fn publish(&mut self, update: &PositionUpdate) -> usize {
        let mut delivered = 0;
        let mut dropped = Vec::new();

        for (id, handle) in &self.subscribers {
            match handle.tx.try_send(update.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Closed(_)) => dropped.push(*id),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(subscriber_id = %id, "Subscriber channel full, detaching");
                    dropped.push(*id);
                }
            }
        }

        for id in dropped {
            self.detach(id);
        }

        delivered
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
