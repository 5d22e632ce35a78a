use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The calendar file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The input is not a well-formed calendar document.
    #[error("invalid calendar document: {0}")]
    Parse(String),

    /// The report could not be created or written.
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: csv::Error },
}
