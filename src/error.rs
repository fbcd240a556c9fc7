use std::path::PathBuf;

use thiserror::Error;

/// A column lookup that the loaded schema cannot satisfy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column '{column}' not found in input header")]
    MissingColumn { column: String },

    #[error("column '{column}' is a {actual} column, expected a {expected} column")]
    WrongKind {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("column '{column}' appears more than once in input header")]
    DuplicateColumn { column: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed opening {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed reading CSV header")]
    Header(#[source] csv::Error),

    #[error("malformed CSV at line {line}")]
    Row {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    NonNumeric {
        line: u64,
        column: String,
        value: String,
    },

    #[error("line {line}: column '{column}' must be a whole non-negative count, got '{value}'")]
    BadCount {
        line: u64,
        column: String,
        value: String,
    },

    #[error("line {line}: indicator column '{column}' must be 0 or 1, got '{value}'")]
    BadIndicator {
        line: u64,
        column: String,
        value: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("link {position} ({from} -> {to}) references a node outside 0..{node_count}")]
    LinkOutOfRange {
        position: usize,
        from: usize,
        to: usize,
        node_count: usize,
    },
}
