//! Database layer for the clinic-finder core.
//!
//! The device store is a flat key-value map persisted in SQLite. Typed
//! repositories sit on top of it, one per record kind.

mod schema;
mod keys;
mod store;
mod doctors;
mod sos;
mod reports;
mod session;

pub use schema::*;
pub use store::*;
pub use doctors::*;
pub use sos::*;
pub use reports::*;
pub use session::*;

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt record at {key}: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },

    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl<T> From<std::sync::PoisonError<T>> for DbError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DbError::LockPoisoned(e.to_string())
    }
}

/// Decode a stored JSON document, tagging failures with the key they came from.
pub(crate) fn decode_record<T: DeserializeOwned>(key: &str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw).map_err(|source| DbError::Decode {
        key: key.to_string(),
        source,
    })
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"kv_store".to_string()));
    }

    #[test]
    fn test_reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let db = Database::open(&path).unwrap();
            db.set("loggedInEmail", "doc@clinic.com").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get("loggedInEmail").unwrap(), Some("doc@clinic.com".into()));
    }

    #[test]
    fn test_decode_record_reports_key() {
        let err = decode_record::<Vec<u32>>("report:x", "not json").unwrap_err();
        match err {
            DbError::Decode { key, .. } => assert_eq!(key, "report:x"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
