//! Key-value backends for persisted store state.
//!
//! Three implementations of [`KeyValueStore`] are provided:
//! - [`MemoryStore`]: a process-local map, used for tests and ephemeral sessions
//! - [`FileStore`]: one file per key inside a data directory
//! - [`SqliteStore`]: a single `kv` table in a `SQLite` database

use crate::error::Result;
use crate::paths;
use crate::traits::KeyValueStore;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// In-memory key-value store.
///
/// Values live only as long as the store itself.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { values: RefCell::new(values) }
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Whether no key has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// File-based key-value store.
///
/// Each key is stored as `<dir>/<encoded-key>.json`. Writes go to a
/// temporary sibling first and are renamed into place, so a crash mid-write
/// leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `dir`.
    ///
    /// The directory is created lazily on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// Get the directory holding the value files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Encode a key as a file stem. ASCII alphanumerics and `-` pass through;
/// every other byte becomes `_XX` (uppercase hex), so distinct keys never
/// share a file. The empty key maps to `_`.
fn sanitize_key(key: &str) -> String {
    use std::fmt::Write;

    if key.is_empty() {
        return "_".to_string();
    }
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "_{byte:02X}");
        }
    }
    encoded
}

/// SQLite-based key-value store.
///
/// Each operation opens a new connection to the database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// Path to the database file.
    db_path: PathBuf,
}

impl SqliteStore {
    /// Create a `SQLite` store in the given data directory.
    ///
    /// The database file will be created at `<data_dir>/gtd.sqlite3`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_data_dir(data_dir: &Path) -> Result<Self> {
        Self::with_path(data_dir.join(paths::DATABASE_FILENAME))
    }

    /// Create a `SQLite` store with a specific database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn with_path(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;

        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.open()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_get_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.get("task-storage").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_overwrites() {
        let store = MemoryStore::new();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_with_entries() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert_eq!(store.get("task-storage").unwrap(), None);
        store.set("task-storage", r#"{"state":{"tasks":[]},"version":0}"#).unwrap();
        assert_eq!(
            store.get("task-storage").unwrap().as_deref(),
            Some(r#"{"state":{"tasks":[]},"version":0}"#)
        );
        assert!(store.path_for("task-storage").exists());
        assert!(!store.path_for("task-storage").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let store = FileStore::new("/tmp/unused");
        let path = store.path_for("../escape/attempt");
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "_2E_2E_2Fescape_2Fattempt.json"
        );
        assert_eq!(sanitize_key("task-storage"), "task-storage");
        assert_eq!(sanitize_key(""), "_");
    }

    #[test]
    fn test_file_store_distinct_keys_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.set("a/b", "one").unwrap();
        store.set("a_b", "two").unwrap();

        assert_ne!(store.path_for("a/b"), store.path_for("a_b"));
        assert_eq!(store.get("a/b").unwrap().as_deref(), Some("one"));
        assert_eq!(store.get("a_b").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_file_store_read_error_propagates() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        // A directory where the value file should be makes the read fail.
        std::fs::create_dir_all(store.path_for("blocked")).unwrap();
        assert!(store.get("blocked").is_err());
    }

    #[test]
    fn test_sqlite_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::in_data_dir(dir.path()).unwrap();
        assert!(store.db_path().exists());

        assert_eq!(store.get("project-storage").unwrap(), None);
        store.set("project-storage", "first").unwrap();
        store.set("project-storage", "second").unwrap();
        assert_eq!(store.get("project-storage").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_sqlite_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("custom.db");

        let store = SqliteStore::with_path(&db_path).unwrap();
        store.set("k", "v").unwrap();
        drop(store);

        let reopened = SqliteStore::with_path(&db_path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_sqlite_store_fails_when_path_is_directory() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("gtd.sqlite3");
        std::fs::create_dir_all(&db_path).unwrap();
        assert!(SqliteStore::with_path(&db_path).is_err());
    }

    #[test]
    fn test_backend_names() {
        let dir = TempDir::new().unwrap();
        assert_eq!(MemoryStore::new().name(), "memory");
        assert_eq!(FileStore::new(dir.path()).name(), "file");
        assert_eq!(SqliteStore::in_data_dir(dir.path()).unwrap().name(), "sqlite");
    }
}
