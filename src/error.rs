//! Crate-wide error type.
//!
//! One variant per error Kind in the design: config problems and per-file
//! read/extract faults are recoverable (callers log and continue), discovery
//! and index-persistence faults and bad queries are surfaced to the caller.

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug)]
pub enum IndexError {
    /// Unreadable or invalid project config. Recovered from by using defaults.
    Config { path: PathBuf, message: String },
    /// Project root unreadable. Fatal for the update.
    Discovery { path: PathBuf, message: String },
    /// Per-file I/O fault. Recovered from by skipping the file.
    Read { path: PathBuf, message: String },
    /// Extractor fault for a single file. Recovered from by dropping that
    /// file's contribution for this update.
    Extract { path: PathBuf, message: String },
    /// Stats cache could not be persisted. Recovered from; next run rebuilds.
    PersistStats { message: String },
    /// Index could not be persisted. Surfaced; in-memory index stays valid.
    PersistIndex { message: String },
    /// Bad regex, unknown concept group, or other malformed query.
    Query { message: String },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::Config { path, message } => {
                write!(f, "config error in {}: {message}", path.display())
            }
            IndexError::Discovery { path, message } => {
                write!(f, "cannot read project root {}: {message}", path.display())
            }
            IndexError::Read { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            IndexError::Extract { path, message } => {
                write!(f, "extraction failed for {}: {message}", path.display())
            }
            IndexError::PersistStats { message } => {
                write!(f, "could not persist stats cache: {message}")
            }
            IndexError::PersistIndex { message } => {
                write!(f, "could not persist index: {message}")
            }
            IndexError::Query { message } => write!(f, "query error: {message}"),
        }
    }
}

impl std::error::Error for IndexError {}

impl IndexError {
    pub fn read(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        IndexError::Read { path: path.into(), message: err.to_string() }
    }

    pub fn extract(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        IndexError::Extract { path: path.into(), message: err.to_string() }
    }

    pub fn config(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        IndexError::Config { path: path.into(), message: err.to_string() }
    }

    pub fn query(message: impl Into<String>) -> Self {
        IndexError::Query { message: message.into() }
    }
}
