//! V002: configuration hash column for per-configuration lookups.

pub const MIGRATION_SQL: &str = r#"
ALTER TABLE fit_cache ADD COLUMN config_hash TEXT NOT NULL DEFAULT '';

CREATE INDEX IF NOT EXISTS idx_fit_cache_config
    ON fit_cache(config_hash);
"#;
