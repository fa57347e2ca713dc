// Key-value persistence behind an injected storage port.
//
// The engine never talks to a concrete storage mechanism directly: it
// goes through `StoragePort`, so tests run against `MemoryStore` and the
// binary wires in `SqliteStore`. Writes are whole-value overwrites of a
// single key; there is no cross-key transaction and no locking between
// processes. Two instances sharing one store file race read-modify-write
// cycles on the same key, and the later writer silently wins. The engine
// has no way to detect other writers, so this stays a documented
// limitation rather than added machinery.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

/// Minimal durable key-value capability the engine depends on.
pub trait StoragePort {
    /// Read the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: StoragePort + ?Sized> StoragePort for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// SQLite-backed store: one `app_state` table of string keys to string
/// values.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path` and ensure the table exists.
    /// Pass `":memory:"` for an ephemeral store (useful for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set store pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS app_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .context("failed to create store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }
}

impl StoragePort for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM app_state WHERE key = ?1")
            .context("failed to prepare store read")?;
        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query store")?;
        match rows.next() {
            Some(row) => Ok(Some(row.context("failed to read store row")?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .with_context(|| format!("failed to write store key {key}"))?;
        Ok(())
    }
}

/// In-memory store fake for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().expect("memory store mutex poisoned");
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().expect("memory store mutex poisoned");
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
