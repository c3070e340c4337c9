//! The organisation query service
//!
//! [`OrgService`] owns the current [`OrgSnapshot`], the tiered result cache
//! and the roster source. Queries read whatever snapshot is current when they
//! start; reloads and declarations build a new snapshot off to the side, swap
//! it in, and then invalidate every cache layer.

use crate::config::QonnectConfig;
use crate::error::ServiceError;
use qonnect_cache::{
    now_millis, CacheConfig, CacheKey, CacheStats, MemoryBackend, RemoteBlobBackend, TieredCache,
};
use qonnect_domain::{
    DeclaredConnection, EmployeeId, EmployeeRecord, ResolvedConnection, RosterSource,
};
use qonnect_graph::{
    resolve_path, ChainOptions, ConnectionResolver, ConnectionStats, HierarchyReport,
    HierarchyView, OrgPath, OrgSnapshot, RosterStats, SearchHit, SearchOptions,
};
use qonnect_store::SqliteBackend;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Outcome of a roster reload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReloadReport {
    /// Version of the snapshot now being served
    pub version: u64,

    /// Employees in the new roster
    pub employees: usize,

    /// Declarations that passed validation
    pub connections: usize,

    /// Hierarchy build summary
    pub hierarchy: HierarchyReport,
}

/// Roster-wide figures for the `stats` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Snapshot version
    pub version: u64,

    /// Population and department counts
    pub roster: RosterStats,

    /// Hierarchy build summary
    pub hierarchy: HierarchyReport,

    /// Declared connection counts and strength breakdown
    pub connections: ConnectionStats,
}

/// Build the cache stack described by `config`
///
/// Memory is always present. The local layer is added when `local_path` is
/// set and the remote layer when `remote_url` is set; a layer that fails to
/// open is logged and left out.
pub fn build_cache(config: &CacheConfig) -> TieredCache {
    let mut builder = TieredCache::builder().layer(MemoryBackend::new(), config.memory_ttl());

    if let Some(path) = &config.local_path {
        match SqliteBackend::new(path) {
            Ok(backend) => builder = builder.layer(backend, config.local_ttl()),
            Err(e) => warn!(path = %path.display(), error = %e, "Local cache unavailable, skipping layer"),
        }
    }

    if let Some(url) = &config.remote_url {
        match RemoteBlobBackend::new(
            url.clone(),
            config.remote_prefix.clone(),
            config.remote_token.clone(),
            config.remote_timeout(),
        ) {
            Ok(backend) => builder = builder.layer(backend, config.remote_ttl()),
            Err(e) => warn!(url = %url, error = %e, "Remote cache unavailable, skipping layer"),
        }
    }

    builder.build()
}

/// Digest of the roster and declarations a snapshot was built from
///
/// Two processes loading the same data agree on it, so durable entries are
/// shared between them; any change to either input yields a new digest.
fn roster_fingerprint(employees: &[EmployeeRecord], connections: &[DeclaredConnection]) -> String {
    let mut hasher = Sha256::new();
    if let Err(e) = serde_json::to_writer(&mut hasher, &(employees, connections)) {
        warn!(error = %e, "Roster not hashable, results will not be shared");
        hasher.update(now_millis().to_be_bytes());
    }
    hex::encode(&hasher.finalize()[..8])
}

/// Fingerprint of `previous` with one more declaration applied
fn declared_fingerprint(previous: &str, connection: &DeclaredConnection) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous.as_bytes());
    if let Err(e) = serde_json::to_writer(&mut hasher, connection) {
        warn!(error = %e, "Declaration not hashable");
        hasher.update(now_millis().to_be_bytes());
    }
    hex::encode(&hasher.finalize()[..8])
}

/// Key for a result computed against `snapshot`
///
/// The snapshot fingerprint keeps a computation that raced a swap from being
/// served under the new snapshot, and keeps durable entries written by another
/// process for different data from being served at all.
fn snapshot_key<const N: usize>(
    operation: &str,
    snapshot: &OrgSnapshot,
    args: [&str; N],
) -> CacheKey {
    CacheKey::new(operation, std::iter::once(snapshot.fingerprint()).chain(args))
}

/// Hierarchy, path and connection queries over a swappable snapshot
pub struct OrgService<S> {
    source: S,
    config: QonnectConfig,
    snapshot: RwLock<Arc<OrgSnapshot>>,
    cache: TieredCache,
    writer: Mutex<()>,
}

impl<S: RosterSource> OrgService<S> {
    /// Create a service with caches built from the configuration
    ///
    /// Nothing is loaded yet; call [`OrgService::reload`] before querying.
    pub fn new(source: S, config: QonnectConfig) -> Self {
        let cache = build_cache(&config.cache);
        Self::with_cache(source, config, cache)
    }

    /// Create a service around a ready-made cache
    pub fn with_cache(source: S, config: QonnectConfig, cache: TieredCache) -> Self {
        info!(layers = ?cache.layer_names(), "Organisation service created");
        Self {
            source,
            config,
            snapshot: RwLock::new(Arc::new(OrgSnapshot::empty())),
            cache,
            writer: Mutex::new(()),
        }
    }

    /// Create a service and load the roster once
    pub fn open(source: S, config: QonnectConfig) -> Result<Self, ServiceError> {
        let service = Self::new(source, config);
        service.reload()?;
        Ok(service)
    }

    /// Active configuration
    pub fn config(&self) -> &QonnectConfig {
        &self.config
    }

    /// Roster source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Snapshot currently being served
    pub fn snapshot(&self) -> Arc<OrgSnapshot> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    fn swap(&self, next: OrgSnapshot) {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
    }

    fn chain_options(&self) -> ChainOptions {
        ChainOptions::from_config(&self.config.graph)
    }

    /// Load employees and declarations from the source and swap them in
    ///
    /// The source is read under the writer lock, so a declaration recorded
    /// meanwhile is either in the loaded data or applied on top of it. On a
    /// source failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<ReloadReport, ServiceError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let employees = self
            .source
            .load_employees()
            .map_err(|e| ServiceError::Source(e.to_string()))?;
        let connections = self
            .source
            .load_connections()
            .map_err(|e| ServiceError::Source(e.to_string()))?;
        Ok(self.replace(employees, connections))
    }

    /// Replace the roster with already-loaded data
    ///
    /// Every cache layer is invalidated unless this is the first load.
    pub fn refresh_with(
        &self,
        employees: Vec<EmployeeRecord>,
        connections: Vec<DeclaredConnection>,
    ) -> ReloadReport {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.replace(employees, connections)
    }

    /// Build and swap in a new snapshot; the caller holds the writer lock
    fn replace(
        &self,
        employees: Vec<EmployeeRecord>,
        connections: Vec<DeclaredConnection>,
    ) -> ReloadReport {
        let previous = self.snapshot().version();
        let version = previous + 1;
        let fingerprint = roster_fingerprint(&employees, &connections);
        let next = OrgSnapshot::build(version, employees, connections).with_fingerprint(fingerprint);

        let report = ReloadReport {
            version,
            employees: next.roster().len(),
            connections: next.ledger().len(),
            hierarchy: next.roster().hierarchy_report().clone(),
        };

        self.swap(next);
        // The first load replaces the empty snapshot; durable entries written
        // by earlier processes for the same roster stay until their TTL runs out
        if previous > 0 {
            self.cache.invalidate_all();
        }

        info!(
            version,
            employees = report.employees,
            connections = report.connections,
            "Roster refreshed"
        );
        report
    }

    /// Hierarchy view of one employee
    pub fn get_hierarchy(&self, id: &EmployeeId) -> Result<HierarchyView, ServiceError> {
        let snapshot = self.snapshot();
        let key = snapshot_key("hierarchy", &snapshot, [id.as_str()]);
        self.cache.get_or_try_compute(&key, || {
            HierarchyView::build(snapshot.roster(), id, self.config.graph.max_chain_depth)
                .ok_or_else(|| ServiceError::NotFound(id.clone()))
        })
    }

    /// Path between two employees; never fails
    ///
    /// Unknown ids yield the estimate described by [`qonnect_graph::PathMethod`].
    pub fn get_organizational_path(&self, from: &EmployeeId, to: &EmployeeId) -> OrgPath {
        let snapshot = self.snapshot();
        let key = snapshot_key("path", &snapshot, [from.as_str(), to.as_str()]);
        self.cache.get_or_compute(&key, || {
            resolve_path(snapshot.roster(), from, to, &self.chain_options())
        })
    }

    /// Resolved Partner connections of one employee
    ///
    /// An unknown id is `NotFound`; a known employee with no ties yields an
    /// empty list.
    pub fn get_connections(&self, id: &EmployeeId) -> Result<Vec<ResolvedConnection>, ServiceError> {
        let snapshot = self.snapshot();
        let key = snapshot_key("connections", &snapshot, [id.as_str()]);
        self.cache.get_or_try_compute(&key, || {
            if !snapshot.roster().contains(id) {
                return Err(ServiceError::NotFound(id.clone()));
            }
            Ok(ConnectionResolver::new(&snapshot, &self.config.graph).resolve(id))
        })
    }

    /// Drop every cached result in every layer
    pub fn invalidate_caches(&self) {
        self.cache.invalidate_all();
        info!("All caches invalidated");
    }

    /// Validate, persist and apply a new declaration
    ///
    /// A zero timestamp is replaced with the current time. The declaration is
    /// visible to the next query after this returns.
    pub fn declare_connection(&self, mut connection: DeclaredConnection) -> Result<(), ServiceError> {
        if connection.timestamp == 0 {
            connection.timestamp = now_millis() / 1000;
        }

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot();
        let next = current
            .with_connection(connection.clone())?
            .with_fingerprint(declared_fingerprint(current.fingerprint(), &connection));

        self.source
            .record_connection(&connection)
            .map_err(|e| ServiceError::Source(e.to_string()))?;

        self.swap(next);
        self.cache.invalidate_all();

        info!(
            from = %connection.from_id,
            to = %connection.to_id,
            strength = connection.strength.as_str(),
            "Connection declared"
        );
        Ok(())
    }

    /// Free-text roster search; not cached
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        self.snapshot().roster().search(query, options)
    }

    /// Resolve a free-form handle (id, email, prefix or name token)
    pub fn find(&self, handle: &str) -> Option<EmployeeId> {
        self.snapshot().roster().find(handle).map(|e| e.id.clone())
    }

    /// Roster-wide figures
    pub fn stats(&self) -> ServiceStats {
        let snapshot = self.snapshot();
        ServiceStats {
            version: snapshot.version(),
            roster: snapshot.roster().stats(),
            hierarchy: snapshot.roster().hierarchy_report().clone(),
            connections: ConnectionStats::collect(snapshot.ledger(), now_millis() / 1000),
        }
    }

    /// Cache hit and miss counters
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Remove expired entries from layers that support purging
    pub fn purge_expired(&self) -> usize {
        let removed = self.cache.purge_expired();
        debug!(removed, "Expired cache entries purged");
        removed
    }
}
