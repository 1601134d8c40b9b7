//! Input table parse errors.

use super::error_code::{self, SweepErrorCode};

/// Errors reading or decoding the delimited input table.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed row in {path} at line {line}: {message}")]
    MalformedRow {
        path: String,
        line: u64,
        message: String,
    },

    #[error("Invalid number in {path} at line {line}, column '{column}': {value:?}")]
    InvalidNumber {
        path: String,
        line: u64,
        column: String,
        value: String,
    },
}

impl SweepErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        error_code::PARSE_ERROR
    }
}
