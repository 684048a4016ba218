//! The instrumentation ledger
//!
//! Composes the timer registry, the memory ledger, the output files and a
//! console sink into the single object a solver owns for one run.
//!
//! States:
//! - detached: built with [`Ledger::detached`]; tallies work, writes fail
//! - active: built with [`Ledger::open`]; everything works
//! - closed: after [`Ledger::close`] or drop; the value no longer exists

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::memory::MemoryLedger;
use crate::serializer::{self, OutputStreams};
use crate::tally::EventTally;
use crate::timer::{Clock, MonotonicClock, TimerRegistry};
use crate::LedgerError;

/// Per-run timing and memory ledger
pub struct Ledger<C: Clock = MonotonicClock> {
    timers: TimerRegistry<C>,
    memory: MemoryLedger,
    streams: Option<OutputStreams>,
    console: Box<dyn Write>,
    print_now: bool,
}

impl Ledger<MonotonicClock> {
    /// Open the three output files in `directory` and start an active ledger
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, LedgerError> {
        Self::open_with_clock(directory, MonotonicClock::new())
    }

    /// Ledger without outputs; every `write_*` returns [`LedgerError::Detached`]
    pub fn detached() -> Self {
        Self::detached_with_clock(MonotonicClock::new())
    }
}

impl<C: Clock> Ledger<C> {
    /// Like [`Ledger::open`], timing with `clock`
    pub fn open_with_clock(directory: impl AsRef<Path>, clock: C) -> Result<Self, LedgerError> {
        let streams = OutputStreams::create(directory)?;
        Ok(Self::build(clock, Some(streams)))
    }

    /// Like [`Ledger::detached`], timing with `clock`
    pub fn detached_with_clock(clock: C) -> Self {
        Self::build(clock, None)
    }

    fn build(clock: C, streams: Option<OutputStreams>) -> Self {
        Self {
            timers: TimerRegistry::with_clock(clock),
            memory: MemoryLedger::new(),
            streams,
            console: Box::new(io::stdout()),
            print_now: false,
        }
    }

    /// Send console output (echoes and `print_*`) somewhere other than stdout
    pub fn with_console<W: Write + 'static>(mut self, console: W) -> Self {
        self.console = Box::new(console);
        self
    }

    /// Whether output files are attached
    pub fn is_active(&self) -> bool {
        self.streams.is_some()
    }

    /// Output directory, if active
    pub fn directory(&self) -> Option<&Path> {
        self.streams.as_ref().map(OutputStreams::directory)
    }

    /// The owner's "print timings as we go" preference (off by default)
    pub fn print_now(&self) -> bool {
        self.print_now
    }

    /// Set the owner's print preference
    pub fn set_print_now(&mut self, print_now: bool) {
        self.print_now = print_now;
    }

    // ---- timers ----

    /// Record the start of `event`, replacing any outstanding start
    pub fn start_timer(&mut self, event: &str) {
        self.timers.start(event);
    }

    /// Stop `event`, accumulate the elapsed seconds and return them
    ///
    /// With `echo`, the event's cumulative total is printed to the console.
    pub fn stop_timer(&mut self, event: &str, echo: bool) -> Result<f64, LedgerError> {
        let delta = self.timers.stop(event)?;
        if echo {
            self.print_time(event);
        }
        Ok(delta)
    }

    /// Time a closure as `event`, handing it the ledger for nested events
    pub fn measure<T>(
        &mut self,
        event: &str,
        body: impl FnOnce(&mut Self) -> T,
    ) -> Result<T, LedgerError> {
        self.start_timer(event);
        let value = body(self);
        self.timers.stop(event)?;
        Ok(value)
    }

    /// Forget `event`'s cumulative total (step and memory tallies untouched)
    pub fn erase_timer(&mut self, event: &str) {
        self.timers.erase(event);
    }

    /// Zero every cumulative total
    pub fn reset_timer(&mut self) {
        self.timers.reset_cumulative();
    }

    /// Zero every step total; call after `write_time_step`
    pub fn reset_time_step(&mut self) {
        self.timers.reset_step();
    }

    /// Cumulative seconds for `event` (zero if unknown)
    pub fn time(&self, event: &str) -> f64 {
        self.timers.cumulative().get(event)
    }

    /// Seconds for `event` in the current step (zero if unknown)
    pub fn step_time(&self, event: &str) -> f64 {
        self.timers.step().get(event)
    }

    /// Cumulative tally, in legend order
    pub fn events(&self) -> &EventTally {
        self.timers.cumulative()
    }

    /// Step tally, in column order
    pub fn step_events(&self) -> &EventTally {
        self.timers.step()
    }

    /// Underlying timer registry
    pub fn timers(&self) -> &TimerRegistry<C> {
        &self.timers
    }

    // ---- memory ----

    /// Add `bytes` to `event`'s memory count
    pub fn alloc_memory(&mut self, event: &str, bytes: f64) {
        self.memory.alloc(event, bytes);
    }

    /// Subtract `bytes` from `event`'s memory count
    pub fn free_memory(&mut self, event: &str, bytes: f64) {
        self.memory.free(event, bytes);
    }

    /// Current signed byte count for `event`
    pub fn memory(&self, event: &str) -> f64 {
        self.memory.bytes(event)
    }

    /// Underlying memory ledger
    pub fn memory_ledger(&self) -> &MemoryLedger {
        &self.memory
    }

    // ---- console ----

    /// Print `event : <cumulative seconds>`
    pub fn print_time(&mut self, event: &str) {
        let value = self.time(event);
        let result = serializer::write_event_line(&mut self.console, event, value);
        console_result(result);
    }

    /// Print `event : <signed bytes>`
    pub fn print_memory(&mut self, event: &str) {
        let value = self.memory.bytes(event);
        let result = serializer::write_event_line(&mut self.console, event, value);
        console_result(result);
    }

    /// Print every cumulative total as a table with a `TOTAL` row
    pub fn print_all_time(&mut self) {
        let result = serializer::write_time_table(&mut self.console, self.timers.cumulative())
            .and_then(|()| self.console.flush());
        console_result(result);
    }

    // ---- files ----

    /// Append `<name> <seconds>` for every event to the totals file
    pub fn write_time(&mut self) -> Result<(), LedgerError> {
        let streams = self.streams.as_mut().ok_or(LedgerError::Detached)?;
        serializer::write_totals(&mut streams.totals, self.timers.cumulative())?;
        Ok(())
    }

    /// Append one row for step `step` to the per-step file
    ///
    /// Does not reset the step tally.
    pub fn write_time_step(&mut self, step: u64) -> Result<(), LedgerError> {
        let streams = self.streams.as_mut().ok_or(LedgerError::Detached)?;
        serializer::write_step_row(&mut streams.steps, step, self.timers.step())?;
        Ok(())
    }

    /// Push buffered output to disk
    pub fn flush(&mut self) -> Result<(), LedgerError> {
        let streams = self.streams.as_mut().ok_or(LedgerError::Detached)?;
        streams.flush()?;
        Ok(())
    }

    /// Write the legend, flush and release the files
    ///
    /// Dropping the ledger does the same but can only log failures. A
    /// detached ledger closes trivially.
    pub fn close(mut self) -> Result<(), LedgerError> {
        match self.streams.take() {
            Some(mut streams) => finish(&mut streams, self.timers.cumulative()),
            None => Ok(()),
        }
    }
}

/// Legend is derived from the cumulative tally at teardown
fn finish(streams: &mut OutputStreams, cumulative: &EventTally) -> Result<(), LedgerError> {
    serializer::write_legend(&mut streams.legend, cumulative)?;
    streams.flush()?;
    info!(
        directory = %streams.directory().display(),
        events = cumulative.len(),
        "profiling outputs closed"
    );
    Ok(())
}

fn console_result(result: io::Result<()>) {
    if let Err(err) = result {
        warn!(error = %err, "console write failed");
    }
}

impl<C: Clock> Drop for Ledger<C> {
    fn drop(&mut self) {
        if let Some(mut streams) = self.streams.take() {
            if let Err(err) = finish(&mut streams, self.timers.cumulative()) {
                warn!(error = %err, "failed to finalize profiling outputs");
            }
        }
    }
}

impl<C: Clock> fmt::Debug for Ledger<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("timers", &self.timers)
            .field("memory", &self.memory)
            .field("directory", &self.directory())
            .field("print_now", &self.print_now)
            .finish_non_exhaustive()
    }
}
