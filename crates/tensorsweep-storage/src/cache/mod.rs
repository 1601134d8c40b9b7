//! SQLite-backed fit cache. Makes interrupted sweeps resumable.

pub mod migrations;
mod pragmas;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tensorsweep_core::errors::StorageError;
use tensorsweep_core::traits::FitCache;
use tensorsweep_core::types::FitResult;

use self::pragmas::apply_pragmas;

fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// Fit results stored as JSON, one row per cache key.
pub struct SqliteFitCache {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteFitCache {
    /// Open (or create) the cache at `path`, apply pragmas, run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::SqliteError {
                message: format!("cannot create {}: {e}", parent.display()),
            })?;
        }
        let conn = Connection::open(path).map_err(sqlite_err)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, StorageError> {
        apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        tracing::debug!(path = ?path, "opened fit cache");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        f(&guard)
    }

    /// Every cached result of one configuration, in key order.
    pub fn results_for_config(&self, config_hash: &str) -> Result<Vec<FitResult>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT cache_key, result_json FROM fit_cache
                     WHERE config_hash = ?1 ORDER BY cache_key",
                )
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![config_hash], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(sqlite_err)?;

            let mut results = Vec::new();
            for row in rows {
                let (key, json) = row.map_err(sqlite_err)?;
                results.push(decode(&key, &json)?);
            }
            Ok(results)
        })
    }

    /// Drop every entry.
    pub fn clear(&self) -> Result<usize, StorageError> {
        self.with_conn(|conn| conn.execute("DELETE FROM fit_cache", []).map_err(sqlite_err))
    }
}

fn decode(key: &str, json: &str) -> Result<FitResult, StorageError> {
    serde_json::from_str(json).map_err(|e| StorageError::CorruptEntry {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl FitCache for SqliteFitCache {
    fn get(&self, key: &str) -> Result<Option<FitResult>, StorageError> {
        let json: Option<String> = self.with_conn(|conn| {
            conn.prepare_cached("SELECT result_json FROM fit_cache WHERE cache_key = ?1")
                .and_then(|mut stmt| stmt.query_row(params![key], |row| row.get(0)).optional())
                .map_err(sqlite_err)
        })?;
        json.map(|j| decode(key, &j)).transpose()
    }

    fn put(&self, key: &str, result: &FitResult) -> Result<(), StorageError> {
        let json = serde_json::to_string(result).map_err(|e| StorageError::CorruptEntry {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO fit_cache (cache_key, result_json, created_at, config_hash)
                 VALUES (?1, ?2, ?3, ?4)",
                params![key, json, Utc::now().timestamp(), result.config_hash],
            )
            .map_err(sqlite_err)?;
            Ok(())
        })
    }

    fn len(&self) -> Result<usize, StorageError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM fit_cache", [], |row| row.get::<_, i64>(0))
                .map(|n| n as usize)
                .map_err(sqlite_err)
        })
    }
}
