#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Spin (not sleep) so the timed interval is real work on this thread.
pub fn busy_wait(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}

pub fn read_lines(dir: &Path, name: &str) -> Vec<String> {
    fs::read_to_string(dir.join(name))
        .unwrap_or_else(|err| panic!("cannot read {name}: {err}"))
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Parse a `profiling` row into its step number and values.
pub fn split_step_row(line: &str) -> (u64, Vec<f64>) {
    assert!(line.ends_with('\t'), "row should end with a tab: {line:?}");
    let mut fields = line.trim_end_matches('\t').split('\t');
    let step = fields.next().expect("step field").parse().expect("step number");
    let values = fields.map(|f| f.parse().expect("numeric value")).collect();
    (step, values)
}

pub const CAVITY_PARAMS: &str = "\
dt: 0.01
startStep: 0
nt: 6
nsave: 3
timeScheme: [EULER_EXPLICIT, EULER_IMPLICIT]
ibmScheme: TAIRA_COLONIUS
linearSolvers:
  - system: velocity
    solver: CG
    preconditioner: DIAGONAL
    relTol: 1.0e-5
    maxIterations: 10000
  - system: Poisson
    solver: CG
    preconditioner: SMOOTHED_AGGREGATION
    relTol: 1.0e-5
    maxIterations: 20000
";
