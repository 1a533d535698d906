use crate::position::PositionUpdate;
use std::collections::VecDeque;

/// In-memory store for the latest accepted position and a bounded history.
///
/// Plain data structure with no interior locking; the tracker engine
/// serializes all access (see TrackerEngine).
#[derive(Debug)]
pub struct PositionStore {
    latest: Option<PositionUpdate>,
    history: VecDeque<PositionUpdate>,
    capacity: usize,
}

impl PositionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            latest: None,
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an accepted update: replace `latest` and append to the history,
    /// evicting oldest entries past capacity. Cannot fail.
    pub fn record(&mut self, update: PositionUpdate) {
        self.history.push_back(update.clone());
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
        self.latest = Some(update);
    }

    pub fn latest(&self) -> Option<&PositionUpdate> {
        self.latest.as_ref()
    }

    /// Snapshot of the history, oldest first
    pub fn history(&self) -> Vec<PositionUpdate> {
        self.history.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
