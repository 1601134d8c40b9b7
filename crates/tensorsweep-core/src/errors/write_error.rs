//! Archive and table persistence errors.

use super::error_code::{self, SweepErrorCode};

/// Persisting an artifact failed. Nothing is visible at the final path.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Cannot create directory {path}: {message}")]
    CreateDir { path: String, message: String },

    #[error("Cannot write {path}: {message}")]
    Io { path: String, message: String },

    #[error("Cannot serialize {artifact}: {message}")]
    Serialize { artifact: String, message: String },

    #[error("Cannot read archive {path}: {message}")]
    Read { path: String, message: String },

    #[error("Archive {path} has format version {found}, expected {expected}")]
    UnsupportedVersion {
        path: String,
        found: u32,
        expected: u32,
    },
}

impl SweepErrorCode for WriteError {
    fn error_code(&self) -> &'static str {
        error_code::WRITE_ERROR
    }
}
