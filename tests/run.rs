//! Driving a ledger through a full schedule and reading the result back

use std::time::Duration;

use phase_ledger::{Ledger, ManualClock, ProfileReport, RunDriver, SimulationParameters};

mod common;
use common::*;

#[test]
fn driven_run_produces_consistent_files() {
    let dir = tempfile::tempdir().unwrap();
    let params = SimulationParameters::from_yaml_str(CAVITY_PARAMS).unwrap();
    let clock = ManualClock::new();
    let ledger = Ledger::open_with_clock(dir.path(), clock.clone()).unwrap();

    let summary = RunDriver::new(params.schedule())
        .run(ledger, |step, ledger| {
            ledger.start_timer("velocity");
            clock.advance(Duration::from_millis(250));
            ledger.stop_timer("velocity", false)?;
            // The Poisson phase only starts being timed from step 3.
            if step >= 3 {
                ledger.start_timer("poisson");
                clock.advance(Duration::from_millis(500));
                ledger.stop_timer("poisson", false)?;
            }
            Ok(())
        })
        .expect("run completes");

    assert_eq!(summary.steps, 6);
    assert_eq!(summary.checkpoints, 2);
    assert_eq!(summary.total_seconds, 6.0 * 0.25 + 4.0 * 0.5);

    let steps = read_lines(dir.path(), "profiling");
    assert_eq!(steps.len(), 6);
    assert_eq!(split_step_row(&steps[0]), (1, vec![0.25]));
    assert_eq!(split_step_row(&steps[5]), (6, vec![0.25, 0.5]));

    let report = ProfileReport::load(dir.path()).unwrap();
    assert_eq!(report.legend, vec!["velocity", "poisson"]);
    assert_eq!(report.rows.len(), 6);

    let stats = report.event_stats();
    assert_eq!(stats[0].name, "velocity");
    assert_eq!(stats[0].steps, 6);
    assert_eq!(stats[0].sum, 1.5);
    assert_eq!(stats[0].total, Some(1.5));
    assert_eq!(stats[1].name, "poisson");
    assert_eq!(stats[1].steps, 4);
    assert_eq!(stats[1].mean, 0.5);
    assert_eq!(stats[1].total, Some(2.0));

    let table = report.render_table();
    assert!(table.contains("velocity"));
    assert!(table.ends_with("6 steps\n"));
}

#[test]
fn missing_outputs_are_reported_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProfileReport::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("profiling_legend"));
}
