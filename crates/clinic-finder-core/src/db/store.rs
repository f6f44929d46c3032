//! Key-value store contract and its SQLite implementation.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

/// String-keyed, string-valued store shared by every repository.
pub trait KeyValueStore {
    /// Get the value at `key`.
    fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Insert or overwrite the value at `key`.
    fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Remove `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> DbResult<bool>;

    /// All keys, in ascending order.
    fn keys(&self) -> DbResult<Vec<String>>;

    /// Keys starting with `prefix`, in ascending order.
    fn keys_with_prefix(&self, prefix: &str) -> DbResult<Vec<String>> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }

    /// Remove `key` only if it still holds `expected`. Returns whether it was removed.
    fn remove_if(&self, key: &str, expected: &str) -> DbResult<bool>;

    /// Run `f` as a single unit: either all of its writes land or none do.
    ///
    /// Stores without transactions just run `f`; callers must then order their
    /// writes so that a partial run loses nothing.
    fn atomically<T, F>(&self, f: F) -> DbResult<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> DbResult<T>,
    {
        f(self)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }

    fn keys(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn keys_with_prefix(&self, prefix: &str) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT key FROM kv_store WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map([prefix], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn remove_if(&self, key: &str, expected: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM kv_store WHERE key = ?1 AND value = ?2",
            params![key, expected],
        )?;
        Ok(rows_affected > 0)
    }

    fn atomically<T, F>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Self) -> DbResult<T>,
    {
        // IMMEDIATE takes the write lock up front so a second writer waits
        // instead of reading a value we are about to move.
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}
