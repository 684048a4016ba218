//! Text formats for the ledger's outputs
//!
//! Three files are consumed by downstream plotting scripts and must keep
//! their exact layout:
//!
//! - `time`: `<name> <seconds>` per event
//! - `profiling`: `<step>\t<v1>\t<v2>\t...\t` per step, values only
//! - `profiling_legend`: one event name per line, the column key for `profiling`
//!
//! The console formats are for humans and carry no compatibility promise.

mod streams;

pub use streams::{OutputStreams, LEGEND_FILE, STEP_FILE, TOTALS_FILE};

use std::io::{self, Write};

use crate::tally::EventTally;

/// Width of the name column in the console table
const NAME_WIDTH: usize = 24;
/// Width of the value column in the console table
const VALUE_WIDTH: usize = 13;

/// One event name per line, in tally order
pub fn write_legend<W: Write>(writer: &mut W, tally: &EventTally) -> io::Result<()> {
    for name in tally.names() {
        writeln!(writer, "{name}")?;
    }
    Ok(())
}

/// `<name> <value>` per event, in tally order
pub fn write_totals<W: Write>(writer: &mut W, tally: &EventTally) -> io::Result<()> {
    for (name, value) in tally.iter() {
        writeln!(writer, "{name} {value}")?;
    }
    Ok(())
}

/// Step number then every tally value, each followed by a tab
pub fn write_step_row<W: Write>(writer: &mut W, step: u64, tally: &EventTally) -> io::Result<()> {
    write!(writer, "{step}\t")?;
    for value in tally.values() {
        write!(writer, "{value}\t")?;
    }
    writeln!(writer)
}

/// `<name> : <value>`
pub fn write_event_line<W: Write>(writer: &mut W, name: &str, value: f64) -> io::Result<()> {
    writeln!(writer, "{name} : {value}")
}

/// Aligned table of every event followed by a `TOTAL` row
pub fn write_time_table<W: Write>(writer: &mut W, tally: &EventTally) -> io::Result<()> {
    writeln!(writer)?;
    for (name, value) in tally.iter() {
        writeln!(writer, "{name:>NAME_WIDTH$}{value:>VALUE_WIDTH$.4}")?;
    }
    writeln!(writer, "{}", "-".repeat(NAME_WIDTH + VALUE_WIDTH))?;
    writeln!(
        writer,
        "{:>NAME_WIDTH$}{:>VALUE_WIDTH$.4}",
        "TOTAL",
        tally.total()
    )
}
