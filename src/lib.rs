//! Converts the timed events of an iCalendar file into a CSV report of
//! working hours.
//!
//! The pipeline is [`Calendar::from_file`], then [`extract_rows`], then
//! [`write_rows`]; [`convert`] runs all three.

use std::path::Path;

use log::debug;

mod calendar;
mod error;
mod extract;
mod report;
mod value;

pub use calendar::{Calendar, EventEntry};
pub use error::{Error, Result};
pub use extract::{event_to_row, extract_rows, Row};
pub use report::{write_rows, HEADER};
pub use value::{DateOrDateTime, Moment};

/// Report path used when no `--output` is given.
pub const DEFAULT_OUTPUT: &str = "working_hours.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// This many rows were written to the output file.
    Written(usize),
    /// Nothing qualified; the output file was not touched.
    NoEvents,
}

/// Loads `input`, extracts its timed events and writes them to `output`.
pub fn convert<I: AsRef<Path>, O: AsRef<Path>>(input: I, output: O) -> Result<Outcome> {
    debug!("Converting {}", input.as_ref().display());

    let calendar = Calendar::from_file(input.as_ref())?;
    let rows = extract_rows(&calendar);

    if rows.is_empty() {
        return Ok(Outcome::NoEvents);
    }

    write_rows(&rows, output)?;

    Ok(Outcome::Written(rows.len()))
}
