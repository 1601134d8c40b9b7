//! SQLite fit cache.

mod common;

use tensorsweep_core::errors::StorageError;
use tensorsweep_core::traits::FitCache;
use tensorsweep_core::types::FitTarget;
use tensorsweep_storage::cache::migrations::{current_version, LATEST_VERSION};
use tensorsweep_storage::SqliteFitCache;

use common::succeeded;

#[test]
fn put_then_get_returns_the_result() {
    let cache = SqliteFitCache::open_in_memory().unwrap();
    assert!(cache.is_empty().unwrap());
    assert!(cache.get("missing").unwrap().is_none());

    let result = succeeded(FitTarget::Full);
    cache.put("k1", &result).unwrap();
    assert_eq!(cache.get("k1").unwrap(), Some(result.clone()));
    assert_eq!(cache.len().unwrap(), 1);

    // Same key overwrites.
    cache.put("k1", &result).unwrap();
    assert_eq!(cache.len().unwrap(), 1);
}

#[test]
fn entries_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache/fits.db");
    let full = succeeded(FitTarget::Full);
    let boot = succeeded(FitTarget::Bootstrap { id: 0 });
    {
        let cache = SqliteFitCache::open(&path).unwrap();
        cache.put("a:full", &full).unwrap();
        cache.put("a:bootstrap0", &boot).unwrap();
    }

    let cache = SqliteFitCache::open(&path).unwrap();
    assert_eq!(cache.path(), Some(path.as_path()));
    assert_eq!(cache.len().unwrap(), 2);
    assert_eq!(cache.get("a:full").unwrap(), Some(full.clone()));

    let for_config = cache.results_for_config(&full.config_hash).unwrap();
    assert_eq!(for_config, vec![boot, full]);

    assert_eq!(cache.clear().unwrap(), 2);
    assert!(cache.is_empty().unwrap());
}

#[test]
fn migrations_reach_the_latest_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fits.db");
    drop(SqliteFitCache::open(&path).unwrap());

    let conn = rusqlite::Connection::open(&path).unwrap();
    assert_eq!(current_version(&conn).unwrap(), LATEST_VERSION);
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn corrupt_rows_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fits.db");
    drop(SqliteFitCache::open(&path).unwrap());
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute(
            "INSERT INTO fit_cache (cache_key, result_json, created_at) VALUES ('bad', '{', 0)",
            [],
        )
        .unwrap();
    }

    let cache = SqliteFitCache::open(&path).unwrap();
    match cache.get("bad") {
        Err(StorageError::CorruptEntry { key, .. }) => assert_eq!(key, "bad"),
        other => panic!("unexpected result: {other:?}"),
    }
}
