use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use phase_ledger::{Ledger, ProfileReport, RunDriver, SimulationParameters};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "phase-ledger", about = "Per-phase timing ledger for iterative solvers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarise the profiling files in a case directory.
    Summarize {
        /// Directory holding `time`, `profiling` and `profiling_legend`.
        directory: PathBuf,
    },
    /// Show the step range and checkpoints a parameter file implies.
    Schedule {
        /// Simulation parameters (YAML).
        params: PathBuf,
    },
    /// Produce profiling files from a synthetic run of the given length.
    Replay {
        /// Simulation parameters (YAML).
        params: PathBuf,
        /// Output directory (created if missing).
        out: PathBuf,
        /// Simulated work per phase, in microseconds.
        #[arg(long, default_value_t = 200)]
        work_us: u64,
        /// Print the timing table at every checkpoint.
        #[arg(long)]
        print_now: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summarize { directory } => run_summarize(directory)?,
        Commands::Schedule { params } => run_schedule(params)?,
        Commands::Replay {
            params,
            out,
            work_us,
            print_now,
        } => run_replay(params, out, work_us, print_now)?,
    }

    Ok(())
}

fn run_summarize(directory: PathBuf) -> Result<()> {
    let report = ProfileReport::load(&directory)
        .with_context(|| format!("failed to load profiling output from {}", directory.display()))?;
    print!("{}", report.render_table());
    Ok(())
}

fn run_schedule(params_path: PathBuf) -> Result<()> {
    let params = SimulationParameters::load(&params_path)?;
    let schedule = params.schedule();
    let steps = schedule.steps();

    println!("steps\t{}..={}\t({} total)", steps.start(), steps.end(), schedule.len());
    println!("dt\t{}", params.dt);
    let checkpoints: Vec<String> = schedule.checkpoints().map(|s| s.to_string()).collect();
    println!("checkpoints\t{}", checkpoints.join(" "));
    for spec in &params.linear_solvers {
        println!(
            "solver\t{}\t{}\t{}\tmaxIterations={}",
            spec.system,
            spec.solver,
            spec.preconditioner.as_deref().unwrap_or("-"),
            spec.max_iterations
        );
    }
    Ok(())
}

fn run_replay(params_path: PathBuf, out: PathBuf, work_us: u64, print_now: bool) -> Result<()> {
    let params = SimulationParameters::load(&params_path)?;
    std::fs::create_dir_all(&out)
        .with_context(|| format!("failed to create output directory {}", out.display()))?;

    let mut ledger = Ledger::open(&out)?;
    ledger.set_print_now(print_now);
    ledger.alloc_memory("fields", 8.0 * 1024.0 * 1024.0);
    let work = Duration::from_micros(work_us);

    let summary = RunDriver::new(params.schedule()).run(ledger, |_, ledger| {
        ledger.start_timer("solve");
        thread::sleep(work);
        ledger.stop_timer("solve", false)?;

        ledger.start_timer("project");
        thread::sleep(work / 2);
        ledger.stop_timer("project", false)?;
        Ok(())
    })?;

    println!(
        "{} steps, {} checkpoints, {:.4} s recorded in {}",
        summary.steps,
        summary.checkpoints,
        summary.total_seconds,
        out.display()
    );
    Ok(())
}
