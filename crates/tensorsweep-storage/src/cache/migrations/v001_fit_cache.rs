//! V001: fit cache table.

pub const MIGRATION_SQL: &str = r#"
-- One completed fit per key (configuration hash, tensor fingerprint, target).
CREATE TABLE IF NOT EXISTS fit_cache (
    cache_key TEXT PRIMARY KEY,
    result_json TEXT NOT NULL,
    created_at INTEGER NOT NULL
) STRICT;
"#;
