//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the local key-value database.
pub const SCHEMA: &str = r#"
-- Familiarity ratings and preferences, keyed by namespaced string
CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
"#;

/// Record the schema version if not exists.
pub const INIT_SCHEMA_VERSION: &str = r#"
INSERT OR IGNORE INTO schema_version (version) VALUES (1);
"#;
