//! Error types for the group QC table

use std::path::PathBuf;

/// Failure to read the fixed-width text of a group table
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number in the table text
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, reason: impl Into<String>) -> Self {
        ParseError {
            line,
            reason: reason.into(),
        }
    }
}

/// Group table errors
#[derive(thiserror::Error, Debug)]
pub enum TableError {
    /// Field names must be non-empty and free of whitespace
    #[error("invalid field name {0:?}")]
    InvalidFieldName(String),

    /// Text values must be non-empty, free of whitespace and not the null token
    #[error("invalid text value {value:?} for field {field}")]
    InvalidValue { field: String, value: String },

    /// Records appended to a group table must carry the subject field
    #[error("record has no {0} field")]
    MissingSubject(&'static str),

    /// Malformed table text
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Existing table file could not be parsed
    #[error("group table {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for group table operations
pub type TableResult<T> = Result<T, TableError>;
