//! Rebuild queue with request coalescing.

use crate::store::PageId;
use std::collections::{HashSet, VecDeque};

/// FIFO of pages waiting to be rebuilt.
///
/// A request for a page that is already queued or being built is absorbed,
/// so a page is never queued twice and never built twice at once.
#[derive(Debug, Default)]
pub struct RebuildQueue {
    order: VecDeque<PageId>,
    queued: HashSet<PageId>,
    in_flight: Option<PageId>,
    requested: u64,
    coalesced: u64,
}

impl RebuildQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a rebuild. Returns false if the request was coalesced.
    pub fn request(&mut self, id: PageId) -> bool {
        self.requested += 1;
        if self.in_flight == Some(id) || self.queued.contains(&id) {
            self.coalesced += 1;
            return false;
        }
        self.queued.insert(id);
        self.order.push_back(id);
        true
    }

    /// Takes the next page and marks it in flight.
    pub fn start_next(&mut self) -> Option<PageId> {
        let id = self.order.pop_front()?;
        self.queued.remove(&id);
        self.in_flight = Some(id);
        Some(id)
    }

    /// Marks the in-flight build as finished.
    pub fn finish(&mut self, id: PageId) {
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
    }

    /// Drops a page from the queue, e.g. after its markup file was deleted.
    pub fn remove(&mut self, id: PageId) {
        if self.queued.remove(&id) {
            self.order.retain(|queued| *queued != id);
        }
    }

    /// Returns true if the page is waiting or being built.
    #[must_use]
    pub fn is_pending(&self, id: PageId) -> bool {
        self.in_flight == Some(id) || self.queued.contains(&id)
    }

    /// Number of pages waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total rebuild requests received.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Requests absorbed by an already pending rebuild.
    #[must_use]
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}
