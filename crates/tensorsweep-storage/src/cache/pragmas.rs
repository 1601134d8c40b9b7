//! Connection settings for the fit cache.

use rusqlite::Connection;
use tensorsweep_core::errors::StorageError;

/// Applied in order on every open.
const CACHE_PRAGMAS: &[(&str, &str)] = &[
    ("journal_mode", "WAL"),
    ("synchronous", "NORMAL"),
    ("busy_timeout", "5000"),
    ("temp_store", "MEMORY"),
];

pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    for (name, value) in CACHE_PRAGMAS {
        // Some pragmas answer with a row, others with none.
        conn.query_row(&format!("PRAGMA {name} = {value}"), [], |_| Ok(()))
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(()),
                other => Err(other),
            })
            .map_err(|e| StorageError::SqliteError {
                message: format!("failed to set {name}={value}: {e}"),
            })?;
    }
    Ok(())
}
