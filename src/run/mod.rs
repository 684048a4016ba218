//! Step-loop driver
//!
//! Encodes the flush protocol an owning solver follows: after every step
//! write the step row and reset the step tally; at checkpoints flush the
//! files; at the end write the totals and close.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StepSchedule;
use crate::ledger::Ledger;
use crate::timer::Clock;

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Steps executed
    pub steps: u64,
    /// Checkpoints reached
    pub checkpoints: u64,
    /// Sum of every event's cumulative seconds at the end
    pub total_seconds: f64,
}

/// Drives a ledger through a step schedule
#[derive(Debug, Clone, Copy)]
pub struct RunDriver {
    schedule: StepSchedule,
}

impl RunDriver {
    /// Driver for the given schedule
    pub fn new(schedule: StepSchedule) -> Self {
        Self { schedule }
    }

    /// Schedule being driven
    pub fn schedule(&self) -> &StepSchedule {
        &self.schedule
    }

    /// Run `body` once per step, then close the ledger
    ///
    /// An error from `body` stops the run; the ledger is dropped, which
    /// still writes the legend for the steps already recorded.
    pub fn run<C, F>(&self, mut ledger: Ledger<C>, mut body: F) -> Result<RunSummary>
    where
        C: Clock,
        F: FnMut(u64, &mut Ledger<C>) -> Result<()>,
    {
        let mut summary = RunSummary {
            steps: 0,
            checkpoints: 0,
            total_seconds: 0.0,
        };

        for step in self.schedule.steps() {
            body(step, &mut ledger).with_context(|| format!("step {step} failed"))?;
            ledger
                .write_time_step(step)
                .with_context(|| format!("cannot record step {step}"))?;
            ledger.reset_time_step();
            summary.steps += 1;

            if self.schedule.is_checkpoint(step) {
                ledger.flush().context("checkpoint flush failed")?;
                if ledger.print_now() {
                    ledger.print_all_time();
                }
                summary.checkpoints += 1;
                debug!(step, "checkpoint");
            }
        }

        summary.total_seconds = ledger.events().total();
        ledger.write_time().context("cannot write totals")?;
        ledger.close().context("cannot close profiling outputs")?;
        info!(
            steps = summary.steps,
            checkpoints = summary.checkpoints,
            total_seconds = summary.total_seconds,
            "run complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::timer::ManualClock;

    #[test]
    fn detached_ledger_cannot_be_driven() {
        let driver = RunDriver::new(StepSchedule::new(0, 2, 1));
        let ledger = Ledger::detached_with_clock(ManualClock::new());
        let err = driver.run(ledger, |_, _| Ok(())).unwrap_err();
        assert!(err.to_string().contains("cannot record step 1"));
    }

    #[test]
    fn body_error_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::new();
        let ledger = Ledger::open_with_clock(dir.path(), clock.clone()).unwrap();
        let driver = RunDriver::new(StepSchedule::new(0, 5, 1));

        let mut seen = Vec::new();
        let err = driver
            .run(ledger, |step, ledger| {
                seen.push(step);
                ledger.start_timer("solve");
                clock.advance(Duration::from_millis(1));
                ledger.stop_timer("solve", false)?;
                anyhow::ensure!(step < 3, "diverged");
                Ok(())
            })
            .unwrap_err();

        assert_eq!(seen, vec![1, 2, 3]);
        assert!(format!("{err:#}").contains("diverged"));
        let legend = std::fs::read_to_string(dir.path().join("profiling_legend")).unwrap();
        assert_eq!(legend, "solve\n");
    }
}
