//! Tiered read-through cache
//!
//! ```text
//! get ──► layer 0 ──miss──► layer 1 ──miss──► layer 2 ──miss──► compute
//!           ▲  hit             │ hit             │ hit              │
//!           └──── promote ─────┘                 │                  │
//!           ▲─────────── promote ────────────────┘                  │
//!           ▲─────────────────── write-through ─────────────────────┘
//! ```

use crate::backend::{now_millis, CacheBackend, CacheEntry};
use crate::key::CacheKey;
use crate::metrics::{CacheCounters, CacheStats};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

struct CacheLayer {
    backend: Box<dyn CacheBackend>,
    ttl: Duration,
}

/// Builder for [`TieredCache`]; layers are consulted in insertion order
#[derive(Default)]
pub struct TieredCacheBuilder {
    layers: Vec<CacheLayer>,
}

impl TieredCacheBuilder {
    /// Append a layer with its TTL
    pub fn layer(mut self, backend: impl CacheBackend + 'static, ttl: Duration) -> Self {
        self.layers.push(CacheLayer {
            backend: Box::new(backend),
            ttl,
        });
        self
    }

    /// Append a boxed layer with its TTL
    pub fn boxed_layer(mut self, backend: Box<dyn CacheBackend>, ttl: Duration) -> Self {
        self.layers.push(CacheLayer { backend, ttl });
        self
    }

    /// Build the cache
    ///
    /// Picks up the newest invalidation recorded in any layer, so an
    /// invalidation made by another process also applies here.
    pub fn build(self) -> TieredCache {
        let counters = CacheCounters::new(self.layers.len());
        let watermark = self
            .layers
            .iter()
            .filter_map(|layer| match layer.backend.get(&watermark_key()) {
                Ok(entry) => entry.map(|e| e.written_at),
                Err(e) => {
                    warn!(layer = layer.backend.name(), error = %e, "Invalidation marker unreadable");
                    None
                }
            })
            .max()
            .unwrap_or(0);

        info!(
            layers = ?self.layers.iter().map(|l| l.backend.name()).collect::<Vec<_>>(),
            watermark,
            "Tiered cache ready"
        );
        TieredCache {
            layers: self.layers,
            counters,
            watermark: AtomicU64::new(watermark),
        }
    }
}

/// Key of the entry recording the last invalidation in each layer
fn watermark_key() -> CacheKey {
    CacheKey::new("__watermark", Vec::<&str>::new())
}

/// Ordered cache layers with promotion and write-through
///
/// Layer failures never reach the caller: they are logged, counted and
/// treated as misses.
pub struct TieredCache {
    layers: Vec<CacheLayer>,
    counters: CacheCounters,
    /// Entries written at or before this instant (ms) are stale everywhere
    watermark: AtomicU64,
}

impl TieredCache {
    /// Start building a cache
    pub fn builder() -> TieredCacheBuilder {
        TieredCacheBuilder::default()
    }

    /// Layer names, fastest first
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.backend.name()).collect()
    }

    /// Return the cached value for `key`, computing and storing it on a miss
    pub fn get_or_compute<V, F>(&self, key: &CacheKey, compute: F) -> V
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce() -> V,
    {
        match self.get_or_try_compute(key, || Ok::<V, std::convert::Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`Self::get_or_compute`], but failed computations are returned
    /// and not cached
    pub fn get_or_try_compute<V, E, F>(&self, key: &CacheKey, compute: F) -> Result<V, E>
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok(value);
        }

        self.counters.computation();
        let value = compute()?;
        self.store(key, &value);
        Ok(value)
    }

    /// Look a key up through every layer, promoting on hit
    pub fn lookup<V: DeserializeOwned>(&self, key: &CacheKey) -> Option<V> {
        let now = now_millis();
        let watermark = self.watermark.load(Ordering::SeqCst);

        for (depth, layer) in self.layers.iter().enumerate() {
            let counters = &self.counters.layers[depth];
            let name = layer.backend.name();

            let entry = match layer.backend.get(key) {
                Ok(Some(entry)) => entry,
                Ok(None) => {
                    counters.miss();
                    continue;
                }
                Err(e) => {
                    counters.error();
                    warn!(layer = name, key = %key, error = %e, "Cache layer read failed");
                    continue;
                }
            };

            if !entry.is_fresh(now, layer.ttl, watermark) {
                counters.expired();
                debug!(layer = name, key = %key, "Cache entry expired");
                continue;
            }

            match serde_json::from_str::<V>(&entry.payload) {
                Ok(value) => {
                    counters.hit();
                    debug!(layer = name, key = %key, "Cache hit");
                    if depth > 0 {
                        self.write_layers(key, &entry.payload, depth);
                    }
                    return Some(value);
                }
                Err(e) => {
                    counters.error();
                    warn!(layer = name, key = %key, error = %e, "Discarding undecodable cache entry");
                }
            }
        }

        None
    }

    /// Write a value through to every layer
    pub fn store<V: Serialize>(&self, key: &CacheKey, value: &V) {
        match serde_json::to_string(value) {
            Ok(payload) => self.write_layers(key, &payload, self.layers.len()),
            Err(e) => warn!(key = %key, error = %e, "Value not cacheable"),
        }
    }

    /// Write `payload` into the first `upto` layers, stamped now
    fn write_layers(&self, key: &CacheKey, payload: &str, upto: usize) {
        let stamp = now_millis().max(self.watermark.load(Ordering::SeqCst) + 1);
        let entry = CacheEntry::new(payload, stamp);

        for (depth, layer) in self.layers.iter().take(upto).enumerate() {
            if let Err(e) = layer.backend.put(key, &entry) {
                self.counters.layers[depth].error();
                warn!(layer = layer.backend.name(), key = %key, error = %e, "Cache layer write failed");
            }
        }
    }

    /// Make every existing entry stale and clear all layers
    ///
    /// Clearing is best effort per layer. The invalidation instant is then
    /// written to every layer, so entries a layer failed to delete are never
    /// served again by this cache or by any cache built over the same layers.
    pub fn invalidate_all(&self) {
        self.watermark.fetch_max(now_millis(), Ordering::SeqCst);
        let marker = CacheEntry::new("invalidated", self.watermark.load(Ordering::SeqCst));
        self.counters.invalidation();

        for (depth, layer) in self.layers.iter().enumerate() {
            if let Err(e) = layer.backend.clear() {
                self.counters.layers[depth].error();
                warn!(layer = layer.backend.name(), error = %e, "Cache layer clear failed");
            }
            if let Err(e) = layer.backend.put(&watermark_key(), &marker) {
                self.counters.layers[depth].error();
                warn!(layer = layer.backend.name(), error = %e, "Invalidation marker not written");
            }
        }

        info!(layers = self.layers.len(), "Caches invalidated");
    }

    /// Drop entries past their layer's TTL; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = now_millis();
        let mut removed = 0;

        for (depth, layer) in self.layers.iter().enumerate() {
            let cutoff = now.saturating_sub(layer.ttl.as_millis() as u64);
            match layer.backend.purge_older_than(cutoff) {
                Ok(n) => removed += n,
                Err(e) => {
                    self.counters.layers[depth].error();
                    warn!(layer = layer.backend.name(), error = %e, "Cache purge failed");
                }
            }
        }

        if removed > 0 {
            info!(removed, "Expired cache entries purged");
        }
        removed
    }

    /// Point-in-time counters
    pub fn stats(&self) -> CacheStats {
        self.counters
            .snapshot(self.layers.iter().map(|l| l.backend.name()))
    }
}
