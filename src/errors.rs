use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Raised when an input file does not carry the fixed column contract.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{}: missing required columns: {}", .file.display(), .missing.join(", "))]
    MissingColumns {
        file: PathBuf,
        missing: Vec<&'static str>,
    },
    #[error("{}: repeated column headers: {}", .file.display(), .duplicates.join(", "))]
    DuplicateColumns {
        file: PathBuf,
        duplicates: Vec<String>,
    },
}

/// Error type for discovering and reading input files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

/// Aggregations that have no meaningful answer for the data they were given.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("cannot compute '{query}' over an empty record set")]
    EmptyDataset { query: &'static str },
    #[error("no product has two consecutive months of sales to compare")]
    NoGrowthData,
}
