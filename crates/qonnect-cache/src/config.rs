//! Configuration for cache layers
//!
//! Defines the TTL of each layer and where the durable layers live.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the tiered cache
///
/// # Examples
///
/// ```
/// use qonnect_cache::CacheConfig;
///
/// // Default configuration (balanced)
/// let config = CacheConfig::default();
/// assert_eq!(config.memory_ttl_secs, 3600);
///
/// // Short-lived entries
/// let config = CacheConfig::aggressive();
/// assert_eq!(config.memory_ttl_secs, 300);
///
/// // Long-lived entries
/// let config = CacheConfig::lenient();
/// assert_eq!(config.remote_ttl_days, 14);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for the in-process layer (in seconds)
    /// Default: 1 hour
    #[serde(default = "default_memory_ttl_secs")]
    pub memory_ttl_secs: u64,

    /// TTL for the local durable layer (in hours)
    /// Default: 72 hours
    #[serde(default = "default_local_ttl_hours")]
    pub local_ttl_hours: u64,

    /// TTL for the remote layer (in days)
    /// Default: 7 days
    #[serde(default = "default_remote_ttl_days")]
    pub remote_ttl_days: u64,

    /// SQLite file for the local layer; no local layer when unset
    #[serde(default)]
    pub local_path: Option<PathBuf>,

    /// Object store endpoint for the remote layer; no remote layer when unset
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Folder under `remote_url` for this deployment's objects
    #[serde(default = "default_remote_prefix")]
    pub remote_prefix: String,

    /// Bearer token for the remote layer
    #[serde(default)]
    pub remote_token: Option<String>,

    /// Per-request timeout for the remote layer (in seconds)
    /// Default: 5 seconds
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,
}

fn default_memory_ttl_secs() -> u64 {
    3600
}

fn default_local_ttl_hours() -> u64 {
    72
}

fn default_remote_ttl_days() -> u64 {
    7
}

fn default_remote_prefix() -> String {
    "qonnect-cache".to_string()
}

fn default_remote_timeout_secs() -> u64 {
    5
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_ttl_secs: default_memory_ttl_secs(),
            local_ttl_hours: default_local_ttl_hours(),
            remote_ttl_days: default_remote_ttl_days(),
            local_path: None,
            remote_url: None,
            remote_prefix: default_remote_prefix(),
            remote_token: None,
            remote_timeout_secs: default_remote_timeout_secs(),
        }
    }
}

impl CacheConfig {
    /// Short TTLs, for rosters that change often
    ///
    /// - Memory: 5 minutes
    /// - Local: 12 hours
    /// - Remote: 1 day
    pub fn aggressive() -> Self {
        Self {
            memory_ttl_secs: 300,
            local_ttl_hours: 12,
            remote_ttl_days: 1,
            remote_timeout_secs: 2,
            ..Self::default()
        }
    }

    /// Long TTLs, for rosters refreshed rarely
    ///
    /// - Memory: 4 hours
    /// - Local: 7 days
    /// - Remote: 14 days
    pub fn lenient() -> Self {
        Self {
            memory_ttl_secs: 4 * 3600,
            local_ttl_hours: 7 * 24,
            remote_ttl_days: 14,
            remote_timeout_secs: 10,
            ..Self::default()
        }
    }

    /// Get memory TTL as Duration
    pub fn memory_ttl(&self) -> Duration {
        Duration::from_secs(self.memory_ttl_secs)
    }

    /// Get local TTL as Duration
    pub fn local_ttl(&self) -> Duration {
        Duration::from_secs(self.local_ttl_hours * 3600)
    }

    /// Get remote TTL as Duration
    pub fn remote_ttl(&self) -> Duration {
        Duration::from_secs(self.remote_ttl_days * 86400)
    }

    /// Get remote request timeout as Duration
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}
