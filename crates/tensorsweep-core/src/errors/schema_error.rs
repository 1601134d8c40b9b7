//! Input table schema errors.

use super::error_code::{self, SweepErrorCode};

/// The input table does not have the shape the pipeline was configured for.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Column '{column}' not found in {path} (available: {available})")]
    MissingColumn {
        path: String,
        column: String,
        available: String,
    },

    #[error("Column '{column}' declared more than once")]
    DuplicateColumn { column: String },

    #[error("No dimension columns declared")]
    NoDimensions,

    #[error("Delimiter {delimiter:?} is not a single-byte character")]
    InvalidDelimiter { delimiter: char },

    #[error("Table {path} has no data rows")]
    EmptyTable { path: String },
}

impl SweepErrorCode for SchemaError {
    fn error_code(&self) -> &'static str {
        error_code::SCHEMA_ERROR
    }
}
