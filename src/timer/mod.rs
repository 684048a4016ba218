//! Timer registry and time accumulators
//!
//! Holds one outstanding tic per event and two tallies updated together on
//! every stop: the run-cumulative tally and the step-local tally.

mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::time::Duration;

use indexmap::IndexMap;
use tracing::debug;

use crate::tally::EventTally;
use crate::LedgerError;

/// Start/stop timers keyed by event name
#[derive(Debug)]
pub struct TimerRegistry<C: Clock = MonotonicClock> {
    clock: C,
    /// In-flight start times
    tics: IndexMap<String, Duration>,
    /// Seconds per event since creation or last `reset_cumulative`
    cumulative: EventTally,
    /// Seconds per event since the last `reset_step`
    step: EventTally,
}

impl TimerRegistry<MonotonicClock> {
    /// Create a registry on the monotonic wall clock
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for TimerRegistry<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimerRegistry<C> {
    /// Create a registry reading time from `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            tics: IndexMap::new(),
            cumulative: EventTally::new(),
            step: EventTally::new(),
        }
    }

    /// Record the tic for `event`
    ///
    /// A second start before the matching stop replaces the first one. The
    /// first start of an event fixes its column position in both tallies.
    pub fn start(&mut self, event: &str) {
        self.cumulative.add(event, 0.0);
        self.step.add(event, 0.0);
        let now = self.clock.now();
        if self.tics.insert(event.to_owned(), now).is_some() {
            debug!(event, "timer restarted before stop; previous tic dropped");
        }
    }

    /// Stop the timer for `event` and return the elapsed seconds
    ///
    /// The delta is added to both tallies and the tic is consumed. Stopping
    /// an event with no outstanding tic leaves every tally untouched.
    pub fn stop(&mut self, event: &str) -> Result<f64, LedgerError> {
        let toc = self.clock.now();
        let tic = self
            .tics
            .shift_remove(event)
            .ok_or_else(|| LedgerError::UnstartedTimer {
                event: event.to_owned(),
            })?;

        let delta = toc.saturating_sub(tic).as_secs_f64();
        self.step.add(event, delta);
        self.cumulative.add(event, delta);
        debug!(event, delta, "timer stopped");
        Ok(delta)
    }

    /// Drop `event` from the cumulative tally only
    pub fn erase(&mut self, event: &str) {
        self.cumulative.remove(event);
    }

    /// Zero the cumulative tally, keeping its events
    pub fn reset_cumulative(&mut self) {
        self.cumulative.zero_all();
    }

    /// Zero the step tally, keeping its events
    pub fn reset_step(&mut self) {
        self.step.zero_all();
    }

    /// Whether `event` has an outstanding tic
    pub fn is_running(&self, event: &str) -> bool {
        self.tics.contains_key(event)
    }

    /// Events started but not yet stopped, in start order
    pub fn running(&self) -> impl Iterator<Item = &str> + '_ {
        self.tics.keys().map(String::as_str)
    }

    /// Run-cumulative tally
    pub fn cumulative(&self) -> &EventTally {
        &self.cumulative
    }

    /// Step-local tally
    pub fn step(&self) -> &EventTally {
        &self.step
    }

    /// Clock driving this registry
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
