//! Step numbering derived from run parameters

use std::ops::RangeInclusive;

/// Which steps a run covers and where checkpoints fall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSchedule {
    /// Step the run starts after
    pub start_step: u64,
    /// Steps to advance
    pub nt: u64,
    /// Checkpoint interval
    pub nsave: u64,
}

impl StepSchedule {
    /// Create a schedule; an interval of zero is treated as one
    pub fn new(start_step: u64, nt: u64, nsave: u64) -> Self {
        Self {
            start_step,
            nt,
            nsave: nsave.max(1),
        }
    }

    /// Step numbers in order: `start_step + 1 ..= start_step + nt`
    ///
    /// Steps past `u64::MAX` are dropped rather than wrapped.
    pub fn steps(&self) -> RangeInclusive<u64> {
        match self.start_step.checked_add(1) {
            Some(first) => first..=self.start_step.saturating_add(self.nt),
            #[allow(clippy::reversed_empty_ranges)]
            None => 1..=0,
        }
    }

    /// Number of steps in the run
    pub fn len(&self) -> u64 {
        self.nt
    }

    /// True for a zero-step run
    pub fn is_empty(&self) -> bool {
        self.nt == 0
    }

    /// Whether outputs are checkpointed after `step`
    pub fn is_checkpoint(&self, step: u64) -> bool {
        step % self.nsave == 0
    }

    /// All checkpoint steps within the run
    pub fn checkpoints(&self) -> impl Iterator<Item = u64> + '_ {
        self.steps().filter(move |&step| self.is_checkpoint(step))
    }
}
