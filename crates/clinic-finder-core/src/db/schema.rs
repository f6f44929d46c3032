//! SQLite schema definition.

/// Complete database schema for the device store.
///
/// The app's storage is a flat string-keyed map; record kinds are told apart by
/// key prefix (see the repositories), not by table.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-value store
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                          -- JSON document or plain string
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
