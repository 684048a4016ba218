//! Memory accounting per event
//!
//! Counts are caller-supplied byte deltas. Nothing is validated: frees may
//! exceed allocations and fractional bytes are kept as given.

use indexmap::IndexMap;
use tracing::debug;

use crate::tally::EventTally;

/// Signed byte counters per event, with high-water marks
#[derive(Debug, Default)]
pub struct MemoryLedger {
    /// Current signed byte count per event
    current: EventTally,

    /// Largest count each event has reached
    peaks: IndexMap<String, f64>,

    /// Sum over all events
    total: f64,

    /// Largest `total` seen
    peak_total: f64,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// `memory[event] += bytes`
    pub fn alloc(&mut self, event: &str, bytes: f64) {
        self.current.add(event, bytes);
        self.total += bytes;
        self.update_peak(event);
        debug!(event, bytes, "memory allocated");
    }

    /// `memory[event] -= bytes`
    pub fn free(&mut self, event: &str, bytes: f64) {
        self.current.add(event, -bytes);
        self.total -= bytes;
        self.update_peak(event);
        debug!(event, bytes, "memory freed");
    }

    fn update_peak(&mut self, event: &str) {
        let now = self.current.get(event);
        // A free-first event starts with a negative peak.
        match self.peaks.get_mut(event) {
            Some(peak) => *peak = peak.max(now),
            None => {
                self.peaks.insert(event.to_owned(), now);
            }
        }
        self.peak_total = self.peak_total.max(self.total);
    }

    /// Current bytes for `event` (zero if never seen)
    pub fn bytes(&self, event: &str) -> f64 {
        self.current.get(event)
    }

    /// Highest count `event` has reached (zero if never seen)
    pub fn peak(&self, event: &str) -> f64 {
        self.peaks.get(event).copied().unwrap_or(0.0)
    }

    /// Current bytes summed over all events
    pub fn current_total(&self) -> f64 {
        self.total
    }

    /// Highest summed count seen so far
    pub fn peak_total(&self) -> f64 {
        self.peak_total
    }

    /// Per-event counts in first-use order
    pub fn tally(&self) -> &EventTally {
        &self.current
    }
}
