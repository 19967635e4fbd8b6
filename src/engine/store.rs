//! Bounded, insertion-ordered event window
//!
//! The store is a FIFO over arrival order, not `created_at` order: late
//! arrivals are accepted wherever they land in the stream. The only removal
//! mechanism is capacity-driven front-eviction. Two views are derived from
//! the one store: `all()` for the textual/list surfaces and `recent(n)` for
//! the spatial surface, which keeps a smaller working set on screen.

use super::types::ReactionEvent;
use std::collections::{HashSet, VecDeque};

pub struct WindowedEventStore {
    events: VecDeque<ReactionEvent>,
    /// Ids currently in the window, for duplicate-admission checks
    ids: HashSet<String>,
    capacity: usize,
}

impl WindowedEventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an event, trimming the front if capacity is exceeded.
    ///
    /// Returns the ids that were evicted so the caller can drop their cached
    /// positions. A duplicate id is a no-op (admission paths may race with
    /// in-flight identity lookups and must be idempotent).
    pub fn insert(&mut self, event: ReactionEvent) -> Vec<String> {
        if self.ids.contains(&event.id) {
            return Vec::new();
        }

        self.ids.insert(event.id.clone());
        self.events.push_back(event);

        let mut evicted = Vec::new();
        while self.events.len() > self.capacity {
            if let Some(old) = self.events.pop_front() {
                self.ids.remove(&old.id);
                evicted.push(old.id);
            }
        }
        evicted
    }

    /// Current ordered sequence, oldest-first.
    pub fn all(&self) -> impl Iterator<Item = &ReactionEvent> {
        self.events.iter()
    }

    /// Newest `n` events, oldest-first. Read-side truncation for the
    /// spatial view; the underlying window is untouched.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ReactionEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
