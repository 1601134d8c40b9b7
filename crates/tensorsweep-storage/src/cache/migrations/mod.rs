//! Cache schema, versioned through `PRAGMA user_version`.

pub mod v001_fit_cache;
pub mod v002_config_index;

use rusqlite::Connection;
use tensorsweep_core::errors::StorageError;

/// `(version, sql)` in application order. Versions are contiguous from 1.
const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_fit_cache::MIGRATION_SQL),
    (2, v002_config_index::MIGRATION_SQL),
];

/// Latest schema version known to this build.
pub const LATEST_VERSION: u32 = MIGRATIONS[MIGRATIONS.len() - 1].0;

/// Bring the schema up to [`LATEST_VERSION`]. Each step commits together with
/// its version bump, so an interrupted upgrade resumes at the failed step.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let from = current_version(conn)?;
    if from > LATEST_VERSION {
        return Err(StorageError::MigrationFailed {
            version: from,
            message: format!("cache schema is newer than this build (max {LATEST_VERSION})"),
        });
    }

    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > from) {
        let failed = |e: rusqlite::Error| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        };
        conn.execute_batch(&format!(
            "BEGIN;\n{sql}\nPRAGMA user_version = {version};\nCOMMIT;"
        ))
        .map_err(|e| {
            let _ = conn.execute_batch("ROLLBACK;");
            failed(e)
        })?;
        tracing::info!(version, "applied cache migration");
    }
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::MigrationFailed {
            version: 0,
            message: e.to_string(),
        })
}
