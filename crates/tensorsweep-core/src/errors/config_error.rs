//! Configuration errors.

use super::error_code::{self, SweepErrorCode};

/// Loading or validating a [`SweepConfig`](crate::config::SweepConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration at {path}")]
    FileNotFound { path: String },

    #[error("cannot parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("{field} must be set")]
    MissingField { field: String },
}

impl SweepErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
