//! Qonnect Tiered Cache
//!
//! A read-through cache composed of ordered layers of increasing durability:
//!
//! 1. in-process memory ([`MemoryBackend`]), short TTL;
//! 2. a local durable store (the SQLite backend in `qonnect-store`), medium TTL;
//! 3. a remote blob store ([`RemoteBlobBackend`]), long TTL.
//!
//! Reads consult the layers in order and promote a hit into every faster
//! layer. A full miss computes the value and writes it through to all layers.
//! TTLs are checked lazily at read time. A failing layer is logged and treated
//! as a miss; callers never see cache errors.
//!
//! # Examples
//!
//! ```
//! use qonnect_cache::{CacheKey, MemoryBackend, TieredCache};
//! use std::time::Duration;
//!
//! let cache = TieredCache::builder()
//!     .layer(MemoryBackend::new(), Duration::from_secs(60))
//!     .build();
//!
//! let key = CacheKey::new("path", ["alice", "bob"]);
//! let first: u32 = cache.get_or_compute(&key, || 3);
//! let second: u32 = cache.get_or_compute(&key, || unreachable!());
//! assert_eq!(first, second);
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod error;
pub mod key;
pub mod memory;
pub mod metrics;
pub mod remote;
pub mod tiered;

pub use backend::{now_millis, CacheBackend, CacheEntry};
pub use config::CacheConfig;
pub use error::CacheError;
pub use key::CacheKey;
pub use memory::MemoryBackend;
pub use metrics::{CacheStats, LayerStats};
pub use remote::RemoteBlobBackend;
pub use tiered::{TieredCache, TieredCacheBuilder};
