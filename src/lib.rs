//! # Phase Ledger
//!
//! In-process instrumentation for long-running iterative solvers. Each
//! logical phase of a run is an *event*; the ledger records wall-clock time
//! and memory deltas per event, both over the whole run and per time step,
//! and writes them to three plain-text files for later plotting.
//!
//! ## Lifecycle
//!
//! 1. **Open**: [`Ledger::open`] creates `time`, `profiling` and
//!    `profiling_legend` inside a case directory
//! 2. **Measure**: the solver brackets phases with `start_timer`/`stop_timer`
//!    and reports buffers with `alloc_memory`/`free_memory`
//! 3. **Step boundary**: `write_time_step(n)` then `reset_time_step()`
//! 4. **Close**: dropping or [`Ledger::close`] writes the legend once
//!
//! ## Usage Example
//!
//! ```no_run
//! use phase_ledger::Ledger;
//!
//! # fn main() -> Result<(), phase_ledger::LedgerError> {
//! let mut ledger = Ledger::open("case")?;
//! for step in 1..=10 {
//!     ledger.start_timer("solve");
//!     // ... advance the solution ...
//!     ledger.stop_timer("solve", false)?;
//!     ledger.write_time_step(step)?;
//!     ledger.reset_time_step();
//! }
//! ledger.write_time()?;
//! ledger.close()
//! # }
//! ```
//!
//! The ledger is single-writer: if the solver is parallel, time and write
//! from one coordinating thread only.

#![warn(missing_docs, missing_debug_implementations)]

pub mod config;     // Simulation parameter files
pub mod ledger;     // The instrumentation ledger facade
pub mod memory;     // Per-event byte counters
pub mod report;     // Reading profiling output back
pub mod run;        // Step-loop driver
pub mod serializer; // Output formats and files
pub mod tally;      // Insertion-ordered accumulators
pub mod timer;      // Tic/toc registry and clocks

pub use config::{LinearSolverSpec, SimulationParameters, StepSchedule};
pub use ledger::Ledger;
pub use memory::MemoryLedger;
pub use report::{EventStats, ProfileReport};
pub use run::{RunDriver, RunSummary};
pub use tally::EventTally;
pub use timer::{Clock, ManualClock, MonotonicClock, TimerRegistry};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    /// One of the output files could not be created
    #[error("cannot open profiling output {}: {source}", path.display())]
    StreamOpen {
        /// File that failed to open
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// `stop_timer` called with no outstanding `start_timer`
    #[error("timer '{event}' stopped without being started")]
    UnstartedTimer {
        /// Event that was stopped
        event: String,
    },

    /// Write requested on a ledger that was never given an output directory
    #[error("ledger has no output directory")]
    Detached,

    /// Writing to an output file failed
    #[error("profiling output write failed: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_culprit() {
        let err = LedgerError::UnstartedTimer {
            event: "solve".into(),
        };
        assert_eq!(err.to_string(), "timer 'solve' stopped without being started");

        let err = LedgerError::StreamOpen {
            path: PathBuf::from("/case/time"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/case/time"));
    }
}
