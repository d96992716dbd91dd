//! Sequencing of page fetches.
//!
//! Fetches are never cancelled. Every request gets a sequence number when it
//! is issued, and only the response to the most recently issued request is
//! allowed to replace the displayed rows.

use tracing::debug;

#[derive(Debug, Default)]
pub struct FetchOrchestrator {
    latest: u64,
    in_flight: usize,
    dirty: bool,
}

impl FetchOrchestrator {
    pub const fn new() -> Self {
        Self {
            latest: 0,
            in_flight: 0,
            dirty: false,
        }
    }

    /// Ask for a refetch at the end of the current update cycle. Several
    /// requests in one cycle collapse into one fetch.
    pub const fn refresh(&mut self) {
        self.dirty = true;
    }

    /// Issue the pending fetch, if any, returning its sequence number.
    pub fn take_pending(&mut self) -> Option<u64> {
        if !std::mem::take(&mut self.dirty) {
            return None;
        }
        self.latest += 1;
        self.in_flight += 1;
        debug!(seq = self.latest, in_flight = self.in_flight, "Issuing page fetch");
        Some(self.latest)
    }

    /// Record a completed fetch. Returns `true` when its rows should be
    /// shown, `false` when a newer request has been issued since.
    pub fn complete(&mut self, seq: u64) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if seq == self.latest {
            return true;
        }
        debug!(seq, latest = self.latest, "Discarding stale page");
        false
    }

    pub const fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    impl FetchOrchestrator {
        const fn latest(&self) -> u64 {
            self.latest
        }
    }

    #[test]
    fn test_refreshes_in_one_cycle_coalesce() {
        let mut fetch = FetchOrchestrator::new();
        assert_eq!(fetch.take_pending(), None);
        fetch.refresh();
        fetch.refresh();
        assert_eq!(fetch.take_pending(), Some(1));
        assert_eq!(fetch.take_pending(), None);
    }

    #[test]
    fn test_latest_response_wins() {
        let mut fetch = FetchOrchestrator::new();
        fetch.refresh();
        let first = fetch.take_pending().unwrap();
        fetch.refresh();
        let second = fetch.take_pending().unwrap();
        assert!(fetch.is_loading());

        // Second resolves first, then the stale first one arrives.
        assert!(fetch.complete(second));
        assert!(!fetch.complete(first));
        assert!(!fetch.is_loading());
    }

    #[test]
    fn test_in_order_responses() {
        let mut fetch = FetchOrchestrator::new();
        fetch.refresh();
        let first = fetch.take_pending().unwrap();
        assert!(fetch.complete(first));
        fetch.refresh();
        let second = fetch.take_pending().unwrap();
        assert!(second > first);
        assert!(fetch.complete(second));
        assert_eq!(fetch.latest(), second);
    }
}
