//! Reading profiling output back
//!
//! Loads the three files a ledger leaves in a case directory and summarises
//! the per-step series column by column. Column `i` of `profiling` is named
//! by line `i` of `profiling_legend`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::serializer::{LEGEND_FILE, STEP_FILE, TOTALS_FILE};

/// Errors from loading a profiling directory
#[derive(Error, Debug)]
pub enum ReportError {
    /// File missing or unreadable
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// Malformed line
    #[error("{file}:{line}: {reason}")]
    Parse {
        /// File name within the directory
        file: &'static str,
        /// 1-based line number
        line: usize,
        /// What could not be parsed
        reason: String,
    },
}

/// One row of the per-step file
#[derive(Debug, Clone, PartialEq)]
pub struct StepRow {
    /// Step number
    pub step: u64,
    /// Seconds per column
    pub values: Vec<f64>,
}

/// Summary of one column of the per-step series
#[derive(Debug, Clone, PartialEq)]
pub struct EventStats {
    /// Legend name, or `column<N>` past the end of the legend
    pub name: String,
    /// Rows that carry this column
    pub steps: usize,
    /// Sum over those rows
    pub sum: f64,
    /// Mean over those rows
    pub mean: f64,
    /// Largest single-step value
    pub max: f64,
    /// Cumulative seconds from the totals file, if listed there
    pub total: Option<f64>,
}

/// Parsed contents of a profiling directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileReport {
    /// Event names in column order
    pub legend: Vec<String>,
    /// Per-step rows in file order
    pub rows: Vec<StepRow>,
    /// `(name, seconds)` from the totals file
    pub totals: Vec<(String, f64)>,
}

impl ProfileReport {
    /// Load `time`, `profiling` and `profiling_legend` from `directory`
    pub fn load(directory: impl AsRef<Path>) -> Result<Self, ReportError> {
        let directory = directory.as_ref();
        let legend = read(directory, LEGEND_FILE)?;
        let steps = read(directory, STEP_FILE)?;
        let totals = read(directory, TOTALS_FILE)?;

        Ok(Self {
            legend: parse_legend(&legend),
            rows: parse_steps(&steps)?,
            totals: parse_totals(&totals)?,
        })
    }

    /// Number of columns across legend and rows
    pub fn columns(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.values.len())
            .max()
            .unwrap_or(0)
            .max(self.legend.len())
    }

    /// Cumulative seconds recorded for `event` in the totals file
    pub fn total(&self, event: &str) -> Option<f64> {
        self.totals
            .iter()
            .rev()
            .find(|(name, _)| name == event)
            .map(|(_, secs)| *secs)
    }

    /// Per-column statistics in legend order
    pub fn event_stats(&self) -> Vec<EventStats> {
        (0..self.columns())
            .map(|column| {
                let name = self
                    .legend
                    .get(column)
                    .cloned()
                    .unwrap_or_else(|| format!("column{column}"));
                let samples: Vec<f64> = self
                    .rows
                    .iter()
                    .filter_map(|row| row.values.get(column).copied())
                    .collect();
                let sum: f64 = samples.iter().sum();
                let mean = if samples.is_empty() {
                    0.0
                } else {
                    sum / samples.len() as f64
                };
                let max = samples.iter().copied().fold(0.0, f64::max);
                let total = self.total(&name);

                EventStats {
                    name,
                    steps: samples.len(),
                    sum,
                    mean,
                    max,
                    total,
                }
            })
            .collect()
    }

    /// Aligned text table of [`ProfileReport::event_stats`]
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>24}{:>8}{:>13}{:>13}{:>13}{:>13}",
            "EVENT", "STEPS", "SUM", "MEAN", "MAX", "TOTAL"
        );
        for stats in self.event_stats() {
            let total = stats
                .total
                .map(|secs| format!("{secs:.4}"))
                .unwrap_or_else(|| "-".to_owned());
            let _ = writeln!(
                out,
                "{:>24}{:>8}{:>13.4}{:>13.6}{:>13.6}{:>13}",
                stats.name, stats.steps, stats.sum, stats.mean, stats.max, total
            );
        }
        let _ = writeln!(out, "{} steps", self.rows.len());
        out
    }
}

fn read(directory: &Path, name: &str) -> Result<String, ReportError> {
    let path = directory.join(name);
    fs::read_to_string(&path).map_err(|source| ReportError::Read { path, source })
}

fn parse_legend(contents: &str) -> Vec<String> {
    contents.lines().map(str::to_owned).collect()
}

fn parse_steps(contents: &str) -> Result<Vec<StepRow>, ReportError> {
    let mut rows = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split('\t').filter(|field| !field.is_empty());
        let step_field = fields.next().unwrap_or_default();
        let step = step_field
            .trim()
            .parse::<u64>()
            .map_err(|_| parse_error(STEP_FILE, idx, format!("bad step number '{step_field}'")))?;
        let values = fields
            .map(|field| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| parse_error(STEP_FILE, idx, format!("bad value '{field}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(StepRow { step, values });
    }
    Ok(rows)
}

fn parse_totals(contents: &str) -> Result<Vec<(String, f64)>, ReportError> {
    let mut totals = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        // Names may contain spaces; the value is after the last one.
        let (name, value) = line
            .rsplit_once(' ')
            .ok_or_else(|| parse_error(TOTALS_FILE, idx, "missing value".to_owned()))?;
        let secs = value
            .parse::<f64>()
            .map_err(|_| parse_error(TOTALS_FILE, idx, format!("bad value '{value}'")))?;
        totals.push((name.to_owned(), secs));
    }
    Ok(totals)
}

fn parse_error(file: &'static str, idx: usize, reason: String) -> ReportError {
    ReportError::Parse {
        file,
        line: idx + 1,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_step_rows_with_trailing_tab() {
        let rows = parse_steps("1\t0.5\t0.25\t\n2\t0.75\t\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values, vec![0.5, 0.25]);
        assert_eq!(rows[1].step, 2);
    }

    #[test]
    fn totals_split_on_last_space() {
        let totals = parse_totals("linear solve 1.5\nio 0.25\n").unwrap();
        assert_eq!(totals[0], ("linear solve".to_owned(), 1.5));
    }

    #[test]
    fn bad_value_reports_line() {
        let err = parse_steps("1\t0.5\t\n2\tabc\t\n").unwrap_err();
        assert_eq!(err.to_string(), "profiling:2: bad value 'abc'");
    }

    #[test]
    fn stats_cover_columns_beyond_legend() {
        let report = ProfileReport {
            legend: vec!["solve".into()],
            rows: vec![
                StepRow { step: 1, values: vec![1.0] },
                StepRow { step: 2, values: vec![3.0, 2.0] },
            ],
            totals: vec![("solve".into(), 4.0)],
        };
        let stats = report.event_stats();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].mean, 2.0);
        assert_eq!(stats[0].max, 3.0);
        assert_eq!(stats[0].total, Some(4.0));
        assert_eq!(stats[1].name, "column1");
        assert_eq!(stats[1].steps, 1);
        assert_eq!(stats[1].total, None);
    }
}
