//! Run counters shared by the Emitter and the lanes

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Thread-safe counters updated while a run is in progress
#[derive(Debug)]
pub struct RunStats {
    enumerated: AtomicUsize,
    dispatched: AtomicUsize,
    dropped: AtomicUsize,
    per_lane: Vec<AtomicUsize>,
}

impl RunStats {
    pub fn new(lanes: usize) -> Self {
        Self {
            enumerated: AtomicUsize::new(0),
            dispatched: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
            per_lane: (0..lanes).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    pub fn set_enumerated(&self, count: usize) {
        self.enumerated.store(count, Ordering::Relaxed);
    }

    pub fn increment_dispatched(&self, lane: usize) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        if let Some(counter) = self.per_lane.get(lane) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Plain copy of the counters, meant to be taken once every thread joined
    pub fn snapshot(&self) -> RunTotals {
        RunTotals {
            enumerated: self.enumerated.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            per_lane: self
                .per_lane
                .iter()
                .map(|c| c.load(Ordering::Relaxed))
                .collect(),
        }
    }
}

/// Final counters of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    /// Paths found by the directory listing
    pub enumerated: usize,
    /// Jobs pushed to a lane
    pub dispatched: usize,
    /// Jobs dropped after a decode, mark or encode failure
    pub dropped: usize,
    /// Jobs dispatched to each lane
    pub per_lane: Vec<usize>,
}
