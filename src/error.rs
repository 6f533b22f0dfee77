//! Error taxonomy shared by the ingestion pipeline, the store, and the reports.
//!
//! Every variant maps to exactly one boundary response (see
//! [`crate::response`]). Validation-side variants carry enough detail for a
//! caller to fix the file; store-side variants keep the engine detail for logs.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// One failing cell: 0-based data row, the schema column name, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellFailure {
    pub row: usize,
    pub column: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("The file format is not allowed, please use CSV files! ('{file_name}')")]
    UnsupportedFormat { file_name: String },

    #[error("File type: '{0}' is not valid file")]
    UnknownEntityKind(String),

    #[error("Parsing error reading the CSV file, please verify the file content! ({reason})")]
    MalformedInput { reason: String },

    #[error("The file provided is empty")]
    EmptyInput,

    #[error(
        "The file provided doesn't match the expected schema! Found {found} column(s), expected {expected:?}"
    )]
    SchemaMismatch { expected: Vec<String>, found: usize },

    #[error("{} cell(s) failed content validation", failures.len())]
    ContentValidation { failures: Vec<CellFailure> },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Data does not contain the values to compute the average!")]
    InsufficientData,
}

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("No database at '{path}', run `init` or upload data first")]
    MissingDatabase { path: PathBuf },

    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
