//! SQLite-backed key-value store.

use crate::db::error::DbError;
use chrono::Utc;
use lingo_core::store::StoreResult;
use lingo_core::KeyValueStore;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

type Result<T> = std::result::Result<T, DbError>;

/// One stored row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StoredEntry {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

/// SQLite database holding familiarity ratings and preferences.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(super::schema::SCHEMA)?;
        conn.execute_batch(super::schema::INIT_SCHEMA_VERSION)?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.conn()?;
        let version = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;
        Ok(version)
    }

    pub fn get_entry(&self, key: &str) -> Result<Option<StoredEntry>> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                "SELECT key, value, updated_at FROM kv_entries WHERE key = ?1",
                params![key],
                |row| {
                    Ok(StoredEntry {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    pub fn put_entry(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn()?.execute(
            "INSERT OR REPLACE INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, now],
        )?;
        Ok(())
    }

    /// All entries whose key starts with `prefix`, ordered by key.
    pub fn entries_with_prefix(&self, prefix: &str) -> Result<Vec<StoredEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT key, value, updated_at FROM kv_entries WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let entries = stmt
            .query_map(params![prefix], |row| {
                Ok(StoredEntry {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.get_entry(key)?.map(|entry| entry.value))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        Ok(self.put_entry(key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::FamiliarityStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn initializes_schema() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), super::super::schema::SCHEMA_VERSION);
    }

    #[test]
    fn set_overwrites_and_stamps() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        let entry = store.get_entry("a").unwrap().unwrap();
        assert_eq!(entry.value, "2");
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.updated_at).is_ok());
    }

    #[test]
    fn prefix_listing_is_literal() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("lingoflow:fam:verbs:1", "2").unwrap();
        store.set("lingoflow:fam:verbs:2", "3").unwrap();
        store.set("lingoflow:fam:nouns:1", "4").unwrap();
        store.set("lingoflow:fam:verbs_old:1", "5").unwrap();

        let keys: Vec<_> = store
            .entries_with_prefix("lingoflow:fam:verbs:")
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec!["lingoflow:fam:verbs:1", "lingoflow:fam:verbs:2"]);
    }

    #[test]
    fn backs_familiarity_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let fam = FamiliarityStore::new(store);
        assert_eq!(fam.get("verbs", 1, 2.0), 2.0);
        assert_eq!(fam.bump("verbs", 1, 0.5, 2.0, 5.0).unwrap(), 2.5);
        assert_eq!(fam.get("verbs", 1, 0.0), 2.5);
    }
}
