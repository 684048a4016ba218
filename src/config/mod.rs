//! Simulation parameter files
//!
//! The solver's parameter file is read here only far enough to drive the
//! ledger: the step range and checkpoint interval. Scheme and solver
//! selectors are carried through as strings and never interpreted.
//!
//! ```yaml
//! dt: 0.01
//! startStep: 0
//! nt: 200
//! nsave: 50
//! timeScheme: [EULER_EXPLICIT, EULER_IMPLICIT]
//! ibmScheme: TAIRA_COLONIUS
//! linearSolvers:
//!   - system: velocity
//!     solver: CG
//!     preconditioner: DIAGONAL
//!     relTol: 1.0e-5
//!     maxIterations: 10000
//! ```

mod schedule;

pub use schedule::StepSchedule;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a parameter file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read parameter file {}: {source}", path.display())]
    Read {
        /// Parameter file path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// File is not valid YAML for the expected structure
    #[error("malformed parameters: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Structurally valid but unusable value
    #[error("invalid parameter {field}: {reason}")]
    Invalid {
        /// Offending key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Run parameters handed to the solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Time-step size
    pub dt: f64,

    /// Step the run restarts from
    #[serde(default)]
    pub start_step: u64,

    /// Number of steps to advance
    pub nt: u64,

    /// Checkpoint interval in steps (defaults to `nt`)
    #[serde(default)]
    pub nsave: Option<u64>,

    /// Time-integration scheme selectors
    #[serde(default)]
    pub time_scheme: Vec<String>,

    /// Immersed-boundary scheme selector
    #[serde(default)]
    pub ibm_scheme: Option<String>,

    /// One entry per linear system solved each step
    #[serde(default)]
    pub linear_solvers: Vec<LinearSolverSpec>,
}

/// Settings for one linear system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearSolverSpec {
    /// Which system (e.g. `velocity`, `Poisson`)
    pub system: String,
    /// Solver family (e.g. `CG`, `BICGSTAB`)
    pub solver: String,
    /// Preconditioner name
    #[serde(default)]
    pub preconditioner: Option<String>,
    /// Absolute residual tolerance
    #[serde(default)]
    pub abs_tol: Option<f64>,
    /// Relative residual tolerance
    #[serde(default)]
    pub rel_tol: Option<f64>,
    /// Iteration cap
    pub max_iterations: u64,
}

impl SimulationParameters {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_yaml::from_str(source)?;
        params.validate()?;
        Ok(params)
    }

    /// Read, parse and validate a parameter file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    /// Check the values the ledger depends on, plus basic sanity
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt > 0.0) {
            return Err(invalid("dt", format!("must be positive, got {}", self.dt)));
        }
        if self.nt == 0 {
            return Err(invalid("nt", "must be at least 1".into()));
        }
        if self.start_step.checked_add(self.nt).is_none() {
            return Err(invalid(
                "startStep",
                format!(
                    "{} + nt {} overflows the step counter",
                    self.start_step, self.nt
                ),
            ));
        }
        if self.nsave == Some(0) {
            return Err(invalid("nsave", "must be at least 1".into()));
        }
        for spec in &self.linear_solvers {
            for (field, tol) in [("absTol", spec.abs_tol), ("relTol", spec.rel_tol)] {
                if let Some(tol) = tol {
                    if !(tol >= 0.0) {
                        return Err(invalid(
                            field,
                            format!("{} system: must be non-negative, got {tol}", spec.system),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Checkpoint interval, falling back to the full run length
    pub fn save_interval(&self) -> u64 {
        self.nsave.unwrap_or(self.nt)
    }

    /// Steps the ledger will see, derived from `startStep`, `nt` and `nsave`
    pub fn schedule(&self) -> StepSchedule {
        StepSchedule::new(self.start_step, self.nt, self.save_interval())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAVITY: &str = "
dt: 0.01
startStep: 100
nt: 20
nsave: 5
timeScheme: [EULER_EXPLICIT, EULER_IMPLICIT]
linearSolvers:
  - system: velocity
    solver: CG
    preconditioner: DIAGONAL
    relTol: 1.0e-5
    maxIterations: 10000
  - system: Poisson
    solver: CG
    preconditioner: SMOOTHED_AGGREGATION
    absTol: 0.0
    relTol: 1.0e-5
    maxIterations: 20000
";

    #[test]
    fn parses_full_document() {
        let params = SimulationParameters::from_yaml_str(CAVITY).unwrap();

        assert_eq!(params.start_step, 100);
        assert_eq!(params.nt, 20);
        assert_eq!(params.save_interval(), 5);
        assert_eq!(params.time_scheme, vec!["EULER_EXPLICIT", "EULER_IMPLICIT"]);
        assert_eq!(params.linear_solvers.len(), 2);
        assert_eq!(params.linear_solvers[1].system, "Poisson");
        assert_eq!(params.linear_solvers[1].max_iterations, 20000);
        assert_eq!(params.ibm_scheme, None);
    }

    #[test]
    fn nsave_defaults_to_run_length() {
        let params = SimulationParameters::from_yaml_str("dt: 0.1\nnt: 30\n").unwrap();
        assert_eq!(params.save_interval(), 30);
        assert_eq!(params.start_step, 0);
    }

    #[test]
    fn unknown_layout_is_a_parse_error() {
        let err = SimulationParameters::from_yaml_str("dt: fast\nnt: 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
