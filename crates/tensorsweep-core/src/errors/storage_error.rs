//! Fit cache storage errors.

use super::error_code::{self, SweepErrorCode};

/// Storage-layer errors for the fit cache.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Corrupt cache entry {key}: {message}")]
    CorruptEntry { key: String, message: String },

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

impl SweepErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        error_code::STORAGE_ERROR
    }
}
