//! In-process memory layer

use crate::backend::{CacheBackend, CacheEntry};
use crate::error::CacheError;
use crate::key::CacheKey;
use dashmap::DashMap;

/// Memory layer backed by a concurrent map
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryBackend {
    /// Create an empty memory layer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.get(key.as_str()).map(|e| e.value().clone()))
    }

    fn put(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
        self.entries.insert(key.as_str().to_string(), entry.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }

    fn purge_older_than(&self, cutoff: u64) -> Result<usize, CacheError> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.written_at >= cutoff);
        Ok(before.saturating_sub(self.entries.len()))
    }
}
