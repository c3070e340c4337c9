//! Cache backend trait and stored entry

use crate::error::CacheError;
use crate::key::CacheKey;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// One stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// JSON-encoded value
    pub payload: String,

    /// When the entry was written (milliseconds since Unix epoch)
    pub written_at: u64,
}

impl CacheEntry {
    /// Create an entry
    pub fn new(payload: impl Into<String>, written_at: u64) -> Self {
        Self {
            payload: payload.into(),
            written_at,
        }
    }

    /// True when the entry is within `ttl` at `now` and newer than the
    /// invalidation watermark
    pub fn is_fresh(&self, now: u64, ttl: Duration, watermark: u64) -> bool {
        if self.written_at <= watermark {
            return false;
        }
        let age = now.saturating_sub(self.written_at);
        u128::from(age) <= ttl.as_millis()
    }
}

/// A single cache layer
///
/// Implementations must tolerate concurrent readers and writers. TTLs are not
/// the backend's concern; the tiered cache checks them on read.
pub trait CacheBackend: Send + Sync {
    /// Short layer name for logs and metrics
    fn name(&self) -> &str;

    /// Fetch an entry
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Insert or replace an entry
    fn put(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError>;

    /// Remove every entry
    fn clear(&self) -> Result<(), CacheError>;

    /// Remove entries written before `cutoff` (ms); returns how many went
    ///
    /// Layers that cannot enumerate their entries keep the default no-op and
    /// rely on read-time TTL checks.
    fn purge_older_than(&self, _cutoff: u64) -> Result<usize, CacheError> {
        Ok(0)
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
