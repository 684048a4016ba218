//! The three output files held open for a run

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::LedgerError;

/// Cumulative totals file name
pub const TOTALS_FILE: &str = "time";
/// Per-step series file name
pub const STEP_FILE: &str = "profiling";
/// Column legend file name
pub const LEGEND_FILE: &str = "profiling_legend";

/// Buffered writers for the totals, per-step and legend files
#[derive(Debug)]
pub struct OutputStreams {
    directory: PathBuf,
    pub(crate) totals: BufWriter<File>,
    pub(crate) steps: BufWriter<File>,
    pub(crate) legend: BufWriter<File>,
}

impl OutputStreams {
    /// Create (truncating) the three files inside an existing directory
    pub fn create(directory: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let directory = directory.as_ref().to_path_buf();
        let totals = open(&directory, TOTALS_FILE)?;
        let steps = open(&directory, STEP_FILE)?;
        let legend = open(&directory, LEGEND_FILE)?;
        info!(directory = %directory.display(), "profiling outputs opened");

        Ok(Self {
            directory,
            totals,
            steps,
            legend,
        })
    }

    /// Directory the files live in
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Flush all three writers, reporting the first failure
    pub fn flush(&mut self) -> io::Result<()> {
        let totals = self.totals.flush();
        let steps = self.steps.flush();
        let legend = self.legend.flush();
        totals.and(steps).and(legend)
    }
}

fn open(directory: &Path, name: &str) -> Result<BufWriter<File>, LedgerError> {
    let path = directory.join(name);
    File::create(&path)
        .map(BufWriter::new)
        .map_err(|source| LedgerError::StreamOpen { path, source })
}
