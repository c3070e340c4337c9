//! Qonnect Storage Layer
//!
//! Implements the local durable cache layer on SQLite. Entries survive process
//! restarts on the same host; TTLs are enforced by the tiered cache on read and
//! by [`SqliteBackend::purge_older_than`] during maintenance.
//!
//! # Examples
//!
//! ```no_run
//! use qonnect_store::SqliteBackend;
//!
//! let backend = SqliteBackend::new("qonnect-cache.db").unwrap();
//! // Backend is now ready to be added as a cache layer
//! ```

#![warn(missing_docs)]

use qonnect_cache::{CacheBackend, CacheEntry, CacheError, CacheKey};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,

    /// Could not prepare the database location
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for CacheError {
    fn from(err: StoreError) -> Self {
        CacheError::Storage(err.to_string())
    }
}

/// SQLite-backed cache layer
///
/// # Thread Safety
///
/// The connection is guarded by a mutex, so one backend can be shared by all
/// readers of a tiered cache.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (or create) the cache database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing). Parent
    /// directories are created when missing.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        debug!(path = %path.display(), "Local cache opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Fetch an entry by rendered key
    pub fn fetch(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                "SELECT payload, written_at FROM cache_entries WHERE key = ?1",
                params![key],
                |row| {
                    Ok(CacheEntry {
                        payload: row.get(0)?,
                        written_at: row.get::<_, i64>(1)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    /// Insert or replace an entry by rendered key
    pub fn upsert(&self, key: &str, entry: &CacheEntry) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO cache_entries (key, payload, written_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, written_at = excluded.written_at",
            params![key, &entry.payload, entry.written_at as i64],
        )?;
        Ok(())
    }

    /// Delete every entry
    pub fn delete_all(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM cache_entries", [])?)
    }

    /// Delete entries written before `cutoff` (ms)
    pub fn delete_before(&self, cutoff: u64) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        Ok(conn.execute(
            "DELETE FROM cache_entries WHERE written_at < ?1",
            params![cutoff as i64],
        )?)
    }

    /// Number of stored entries
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl CacheBackend for SqliteBackend {
    fn name(&self) -> &str {
        "local"
    }

    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.fetch(key.as_str())?)
    }

    fn put(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
        Ok(self.upsert(key.as_str(), entry)?)
    }

    fn clear(&self) -> Result<(), CacheError> {
        let removed = self.delete_all()?;
        debug!(removed, "Local cache cleared");
        Ok(())
    }

    fn purge_older_than(&self, cutoff: u64) -> Result<usize, CacheError> {
        Ok(self.delete_before(cutoff)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces() {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.upsert("k", &CacheEntry::new("1", 10)).unwrap();
        backend.upsert("k", &CacheEntry::new("2", 20)).unwrap();

        let entry = backend.fetch("k").unwrap().unwrap();
        assert_eq!(entry.payload, "2");
        assert_eq!(entry.written_at, 20);
        assert_eq!(backend.count().unwrap(), 1);
    }

    #[test]
    fn test_missing_key() {
        let backend = SqliteBackend::in_memory().unwrap();
        assert!(backend.fetch("absent").unwrap().is_none());
    }

    #[test]
    fn test_delete_before() {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.upsert("old", &CacheEntry::new("1", 10)).unwrap();
        backend.upsert("new", &CacheEntry::new("1", 30)).unwrap();

        assert_eq!(backend.delete_before(20).unwrap(), 1);
        assert!(backend.fetch("old").unwrap().is_none());
        assert!(backend.fetch("new").unwrap().is_some());
    }
}
