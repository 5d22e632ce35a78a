use std::io;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::debug;

use crate::error::{Error, Result};
use crate::extract::Row;

pub const HEADER: [&str; 5] = ["Date", "Start", "End", "Summary", "Duration(min)"];

/// Writes the header and `rows` to `path`, replacing any existing file.
pub fn write_rows<P: AsRef<Path>>(rows: &[Row], path: P) -> Result<()> {
    let path = path.as_ref();
    let to_error = |source: csv::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = builder().from_path(path).map_err(to_error)?;
    write_records(&mut writer, rows).map_err(to_error)?;

    debug!("Wrote {} row(s) to {}", rows.len(), path.display());
    Ok(())
}

fn builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF);
    builder
}

fn write_records<W: io::Write>(writer: &mut csv::Writer<W>, rows: &[Row]) -> csv::Result<()> {
    writer.write_record(HEADER)?;

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}
