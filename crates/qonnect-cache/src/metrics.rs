//! Per-layer cache counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one layer
#[derive(Debug, Default)]
pub(crate) struct LayerCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    errors: AtomicU64,
}

impl LayerCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn expired(&self) {
        self.expired.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, name: &str) -> LayerStats {
        LayerStats {
            name: name.to_string(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Live counters for a whole tiered cache
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    pub(crate) layers: Vec<LayerCounters>,
    computations: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn new(layers: usize) -> Self {
        Self {
            layers: (0..layers).map(|_| LayerCounters::default()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot<'a>(&self, names: impl Iterator<Item = &'a str>) -> CacheStats {
        CacheStats {
            layers: self
                .layers
                .iter()
                .zip(names)
                .map(|(counters, name)| counters.snapshot(name))
                .collect(),
            computations: self.computations.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counters for one layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStats {
    /// Layer name
    pub name: String,

    /// Fresh entries served
    pub hits: u64,

    /// Lookups that found nothing
    pub misses: u64,

    /// Entries found but past TTL or invalidated
    pub expired: u64,

    /// Failed reads, writes or undecodable entries
    pub errors: u64,
}

impl LayerStats {
    /// Hits over all lookups that reached this layer
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.expired + self.errors;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Point-in-time counters for a tiered cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// One entry per layer, fastest first
    pub layers: Vec<LayerStats>,

    /// Values computed after a full miss
    pub computations: u64,

    /// Calls to `invalidate_all`
    pub invalidations: u64,
}

impl CacheStats {
    /// Total hits across all layers
    pub fn total_hits(&self) -> u64 {
        self.layers.iter().map(|l| l.hits).sum()
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Cache Summary".to_string(),
            "=============".to_string(),
            format!("Computations: {}", self.computations),
            format!("Invalidations: {}", self.invalidations),
            String::new(),
        ];

        for layer in &self.layers {
            lines.push(format!(
                "{}: {} hits, {} misses, {} expired, {} errors ({:.1}% hit rate)",
                layer.name,
                layer.hits,
                layer.misses,
                layer.expired,
                layer.errors,
                layer.hit_rate() * 100.0
            ));
        }

        lines.join("\n")
    }
}
