//! Per-event accumulators
//!
//! Every tally in the ledger (cumulative time, step time, memory) is a map
//! from event name to `f64`, iterated in first-insertion order.

use indexmap::IndexMap;

/// Insertion-ordered map from event name to an accumulated value
///
/// Lookups of unknown events read as `0.0`; additions create the event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTally {
    values: IndexMap<String, f64>,
}

impl EventTally {
    /// Create an empty tally
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Default-valued lookup: events never seen read as zero
    pub fn get(&self, event: &str) -> f64 {
        self.values.get(event).copied().unwrap_or(0.0)
    }

    /// `tally[event] += delta`, inserting the event at the end if new
    pub fn add(&mut self, event: &str, delta: f64) {
        match self.values.get_mut(event) {
            Some(value) => *value += delta,
            None => {
                self.values.insert(event.to_owned(), delta);
            }
        }
    }

    /// Zero every value while keeping the key set and its order
    pub fn zero_all(&mut self) {
        for value in self.values.values_mut() {
            *value = 0.0;
        }
    }

    /// Remove an event, preserving the order of the others
    pub fn remove(&mut self, event: &str) -> Option<f64> {
        self.values.shift_remove(event)
    }

    /// Whether the event has ever been recorded (and not removed)
    pub fn contains(&self, event: &str) -> bool {
        self.values.contains_key(event)
    }

    /// Number of known events
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no event is known
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Event names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    /// Values in insertion order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.values().copied()
    }

    /// `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Sum of all values
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_reads_zero() {
        let tally = EventTally::new();
        assert_eq!(tally.get("never"), 0.0);
        assert!(!tally.contains("never"));
    }

    #[test]
    fn add_accumulates_and_keeps_first_insertion_order() {
        let mut tally = EventTally::new();
        tally.add("b", 1.0);
        tally.add("a", 2.0);
        tally.add("b", 0.5);

        assert_eq!(tally.get("b"), 1.5);
        assert_eq!(tally.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(tally.total(), 3.5);
    }

    #[test]
    fn zero_all_keeps_keys() {
        let mut tally = EventTally::new();
        tally.add("x", 4.0);
        tally.add("y", 1.0);
        tally.zero_all();

        assert_eq!(tally.len(), 2);
        assert_eq!(tally.values().collect::<Vec<_>>(), vec![0.0, 0.0]);
    }

    #[test]
    fn remove_then_reinsert_moves_to_end() {
        let mut tally = EventTally::new();
        tally.add("a", 1.0);
        tally.add("b", 1.0);
        tally.add("c", 1.0);

        assert_eq!(tally.remove("a"), Some(1.0));
        assert_eq!(tally.remove("a"), None);
        tally.add("a", 3.0);

        assert_eq!(tally.names().collect::<Vec<_>>(), vec!["b", "c", "a"]);
        assert_eq!(tally.get("a"), 3.0);
    }
}
