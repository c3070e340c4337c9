//! Integration tests for qonnect-service
//!
//! These tests drive the service facade end to end over an in-memory roster.

use qonnect_domain::{
    ConnectionSource, ConnectionStrength, DeclaredConnection, EmployeeId, EmployeeRecord,
    Population, RosterSource,
};
use qonnect_cache::{CacheBackend, CacheEntry, CacheError, CacheKey, MemoryBackend, TieredCache};
use qonnect_graph::{LedgerRejection, PathMethod, SearchOptions};
use qonnect_service::{
    JsonRosterSource, OrgService, QonnectConfig, RefreshWorker, RosterConfig, ServiceError,
    StaticRoster, WarmCheckpoint, WarmTargets,
};
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn id(raw: &str) -> EmployeeId {
    EmployeeId::new(raw)
}

fn primary(raw: &str, manager: Option<&str>, department: &str) -> EmployeeRecord {
    let mut record = EmployeeRecord::new(raw, raw.to_uppercase(), format!("{raw}@corp.example"))
        .with_department(department)
        .with_population(Population::Primary);
    if let Some(m) = manager {
        record = record.with_manager(format!("{m}@corp.example"));
    }
    record
}

fn partner(raw: &str, department: &str) -> EmployeeRecord {
    EmployeeRecord::new(raw, raw.to_uppercase(), format!("{raw}@partner.example"))
        .with_department(department)
        .with_population(Population::Partner)
}

/// ceo <- vp <- {alice, carol}; partners zed and yan; vp declared zed
fn roster() -> StaticRoster {
    StaticRoster::new(
        vec![
            primary("ceo", None, "Exec"),
            primary("vp", Some("ceo"), "Eng"),
            primary("alice", Some("vp"), "Eng"),
            primary("carol", Some("vp"), "Sales"),
            partner("zed", "Delivery"),
            partner("yan", "Delivery"),
        ],
        vec![DeclaredConnection::new("vp", "zed", ConnectionStrength::Strong)],
    )
}

fn service() -> OrgService<StaticRoster> {
    OrgService::open(roster(), QonnectConfig::default()).unwrap()
}

/// Source whose next `load_connections` pauses after reading until released
struct GatedRoster {
    inner: StaticRoster,
    armed: AtomicBool,
    entered: Barrier,
    release: Barrier,
}

impl GatedRoster {
    fn new(inner: StaticRoster) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
            entered: Barrier::new(2),
            release: Barrier::new(2),
        }
    }
}

impl RosterSource for GatedRoster {
    type Error = Infallible;

    fn load_employees(&self) -> Result<Vec<EmployeeRecord>, Self::Error> {
        self.inner.load_employees()
    }

    fn load_connections(&self) -> Result<Vec<DeclaredConnection>, Self::Error> {
        let connections = self.inner.load_connections();
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
        connections
    }

    fn record_connection(&self, connection: &DeclaredConnection) -> Result<(), Self::Error> {
        self.inner.record_connection(connection)
    }
}

/// Durable layer shared between services the way a remote store is shared
/// between processes; clearing it always fails
#[derive(Clone, Default)]
struct SharedRemote(Arc<MemoryBackend>);

impl CacheBackend for SharedRemote {
    fn name(&self) -> &str {
        "remote"
    }
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        self.0.get(key)
    }
    fn put(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
        self.0.put(key, entry)
    }
    fn clear(&self) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("folder delete unsupported".into()))
    }
}

fn shared_cache(remote: &SharedRemote) -> TieredCache {
    TieredCache::builder()
        .layer(MemoryBackend::new(), Duration::from_secs(60))
        .layer(remote.clone(), Duration::from_secs(3600))
        .build()
}

#[test]
fn test_hierarchy_view() {
    let service = service();
    let view = service.get_hierarchy(&id("ALICE")).unwrap();

    let chain: Vec<&str> = view.manager_chain.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(chain, vec!["vp", "ceo"]);
    assert_eq!(view.hierarchy_depth, 2);
    assert_eq!(view.peer_count, 1);
    assert_eq!(view.total_reports, 0);

    let vp = service.get_hierarchy(&id("vp")).unwrap();
    assert_eq!(vp.total_reports, 2);
}

#[test]
fn test_unknown_employee_is_not_found_and_not_cached() {
    let service = service();
    for _ in 0..2 {
        let err = service.get_hierarchy(&id("nobody")).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref missing) if missing.as_str() == "nobody"));
    }
    assert_eq!(service.cache_stats().computations, 2);
    assert!(matches!(
        service.get_connections(&id("nobody")),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn test_paths() {
    let service = service();

    let siblings = service.get_organizational_path(&id("alice"), &id("carol"));
    assert_eq!(siblings.method, PathMethod::Siblings);
    assert_eq!(siblings.intermediate_count, 2);

    let ancestor = service.get_organizational_path(&id("alice"), &id("ceo"));
    assert_eq!(ancestor.method, PathMethod::Ancestor);
    assert_eq!(ancestor.intermediate_count, 2);

    let unknown = service.get_organizational_path(&id("alice"), &id("ghost"));
    assert!(unknown.method.is_estimate());
    assert_eq!(unknown.intermediate_count, 1);
}

#[test]
fn test_connections_transitive_then_inferred() {
    let service = service();
    let connections = service.get_connections(&id("alice")).unwrap();

    assert_eq!(connections.len(), 2);
    assert_eq!(connections[0].partner_id, id("zed"));
    assert_eq!(connections[0].source, ConnectionSource::Transitive);
    assert_eq!(connections[0].via, Some(id("vp")));
    assert_eq!(connections[0].path_length, 1);

    assert_eq!(connections[1].partner_id, id("yan"));
    assert_eq!(connections[1].source, ConnectionSource::Inferred);
    assert_eq!(connections[1].strength, ConnectionStrength::Weak);
}

#[test]
fn test_repeated_queries_hit_the_cache() {
    let service = service();
    let first = service.get_connections(&id("alice")).unwrap();
    let second = service.get_connections(&id("alice")).unwrap();

    assert_eq!(first, second);
    let stats = service.cache_stats();
    assert_eq!(stats.computations, 1);
    assert_eq!(stats.total_hits(), 1);
}

#[test]
fn test_declaration_is_visible_to_the_next_query() {
    let service = service();
    let before = service.get_connections(&id("alice")).unwrap();
    assert_eq!(before[0].source, ConnectionSource::Transitive);

    service
        .declare_connection(DeclaredConnection::new("alice", "zed", ConnectionStrength::Weak))
        .unwrap();

    let after = service.get_connections(&id("alice")).unwrap();
    assert_eq!(after[0].partner_id, id("zed"));
    assert_eq!(after[0].source, ConnectionSource::Declared);
    assert_eq!(after[0].path_length, 2);

    let recorded = service.source().connections();
    assert_eq!(recorded.len(), 2);
    assert!(recorded[1].timestamp > 0);
    assert_eq!(service.snapshot().version(), 2);
}

#[test]
fn test_invalid_declarations_are_rejected() {
    let service = service();

    let err = service
        .declare_connection(DeclaredConnection::new("zed", "alice", ConnectionStrength::Strong))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidConnection(LedgerRejection::FromNotPrimary(_))
    ));

    let err = service
        .declare_connection(DeclaredConnection::new("alice", "ghost", ConnectionStrength::Strong))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidConnection(LedgerRejection::UnknownTo(_))));

    assert_eq!(service.source().connections().len(), 1);
    assert_eq!(service.snapshot().version(), 1);
}

#[test]
fn test_reload_picks_up_roster_changes() {
    let service = service();
    assert_eq!(service.get_hierarchy(&id("carol")).unwrap().hierarchy_depth, 2);

    let mut moved = roster().load_employees().unwrap();
    for record in &mut moved {
        if record.id == id("carol") {
            record.manager_ref = "ceo@corp.example".to_string();
        }
    }
    service.source().set_employees(moved);
    let report = service.reload().unwrap();

    assert_eq!(report.version, 2);
    assert_eq!(report.employees, 6);
    assert_eq!(service.get_hierarchy(&id("carol")).unwrap().hierarchy_depth, 1);
}

#[test]
fn test_search_and_stats() {
    let service = service();
    let hits = service.search("ali", &SearchOptions::default());
    assert_eq!(hits[0].id, id("alice"));

    let stats = service.stats();
    assert_eq!(stats.roster.total, 6);
    assert_eq!(stats.roster.primary, 4);
    assert_eq!(stats.roster.partner, 2);
    assert_eq!(stats.connections.total, 1);
    assert_eq!(stats.connections.strong, 1);
    assert_eq!((stats.connections.medium, stats.connections.weak), (0, 0));
    assert_eq!(service.find("alice@corp.example"), Some(id("alice")));
}

#[test]
fn test_warm_top_primary() {
    let service = service();
    let report = service.warm(&WarmTargets::TopPrimary(3));

    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 3);
    assert!(!report.stopped_early);

    let computed = service.cache_stats().computations;
    service.get_connections(&id("ceo")).unwrap();
    assert_eq!(service.cache_stats().computations, computed);
}

#[test]
fn test_warm_stops_after_consecutive_failures() {
    let mut config = QonnectConfig::default();
    config.warm.max_consecutive_failures = 2;
    let service = OrgService::open(roster(), config).unwrap();

    let report = service.warm(&WarmTargets::Employees(vec![
        id("ghost1"),
        id("alice"),
        id("ghost2"),
        id("ghost3"),
        id("vp"),
    ]));

    assert_eq!(report.attempted, 4);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 3);
    assert!(report.stopped_early);
}

#[test]
fn test_warm_resumes_from_checkpoint() {
    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("warm.json");
    let mut config = QonnectConfig::default();
    config.warm.max_consecutive_failures = 2;
    let service = OrgService::open(roster(), config).unwrap();
    let targets = WarmTargets::Employees(vec![
        id("ghost1"),
        id("ghost2"),
        id("alice"),
        id("vp"),
        id("carol"),
    ]);

    let first = service.warm_resumable(&targets, &checkpoint);
    assert_eq!(first.attempted, 2);
    assert!(first.stopped_early);

    let second = service.warm_resumable(&targets, &checkpoint);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.attempted, 3);
    assert_eq!(second.succeeded, 3);
    assert!(!second.stopped_early);

    let saved = WarmCheckpoint::load(&checkpoint);
    assert_eq!(saved.processed.len(), 5);
    assert_eq!((saved.succeeded, saved.failed), (3, 2));

    let third = service.warm_resumable(&targets, &checkpoint);
    assert_eq!(third.attempted, 0);
    assert_eq!(third.skipped, 5);
}

#[test]
fn test_json_source_end_to_end() {
    let dir = TempDir::new().unwrap();
    let roster_config = RosterConfig {
        employees_path: dir.path().join("employees.json"),
        connections_path: dir.path().join("connections.json"),
        primary_organisation: "Google".to_string(),
        partner_organisation: "Olenick".to_string(),
        ..RosterConfig::default()
    };
    std::fs::write(
        &roster_config.employees_path,
        r#"[
            {"ldap": "boss", "name": "Boss", "email": "boss@corp.example", "organisation": "Google"},
            {"ldap": "dev", "name": "Dev", "email": "dev@corp.example", "organisation": "Google",
             "manager": "boss@corp.example"},
            {"ldap": "ext", "name": "Ext", "email": "ext@partner.example", "organisation": "Olenick"}
        ]"#,
    )
    .unwrap();

    let config = QonnectConfig {
        roster: roster_config.clone(),
        ..QonnectConfig::default()
    };
    let service = OrgService::open(JsonRosterSource::new(&roster_config), config.clone()).unwrap();
    service
        .declare_connection(DeclaredConnection::new("boss", "ext", ConnectionStrength::Medium))
        .unwrap();

    // A second process sees the persisted declaration
    let reopened = OrgService::open(JsonRosterSource::new(&roster_config), config).unwrap();
    let connections = reopened.get_connections(&id("dev")).unwrap();
    assert_eq!(connections[0].partner_id, id("ext"));
    assert_eq!(connections[0].source, ConnectionSource::Transitive);
    assert_eq!(connections[0].via, Some(id("boss")));
}

#[test]
fn test_local_cache_layer_from_config() {
    let dir = TempDir::new().unwrap();
    let mut config = QonnectConfig::default();
    config.cache.local_path = Some(dir.path().join("cache").join("qonnect.db"));

    let service = OrgService::open(roster(), config).unwrap();
    assert_eq!(service.cache_stats().layers.len(), 2);

    service.get_hierarchy(&id("alice")).unwrap();
    assert!(dir.path().join("cache").join("qonnect.db").exists());
}

#[test]
fn test_durable_entries_survive_restart_until_reload() {
    let dir = TempDir::new().unwrap();
    let mut config = QonnectConfig::default();
    config.cache.local_path = Some(dir.path().join("qonnect.db"));

    let first = OrgService::open(roster(), config.clone()).unwrap();
    let computed = first.get_connections(&id("alice")).unwrap();
    drop(first);

    let second = OrgService::open(roster(), config).unwrap();
    assert_eq!(second.get_connections(&id("alice")).unwrap(), computed);
    assert_eq!(second.cache_stats().computations, 0);

    // A later reload drops everything
    second.reload().unwrap();
    second.get_connections(&id("alice")).unwrap();
    assert_eq!(second.cache_stats().computations, 1);
    assert_eq!(second.cache_stats().invalidations, 1);
}

#[test]
fn test_reload_overlapping_declaration_keeps_it() {
    let service = Arc::new(
        OrgService::open(GatedRoster::new(roster()), QonnectConfig::default()).unwrap(),
    );
    service.source().armed.store(true, Ordering::SeqCst);

    let reloader = {
        let service = Arc::clone(&service);
        thread::spawn(move || service.reload().map(|report| report.version))
    };
    service.source().entered.wait();

    let declarer = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            service.declare_connection(DeclaredConnection::new(
                "alice",
                "zed",
                ConnectionStrength::Strong,
            ))
        })
    };
    thread::sleep(Duration::from_millis(50));
    service.source().release.wait();

    reloader.join().unwrap().unwrap();
    declarer.join().unwrap().unwrap();

    assert_eq!(service.source().inner.connections().len(), 2);
    assert_eq!(service.snapshot().ledger().len(), 2);
    let connections = service.get_connections(&id("alice")).unwrap();
    assert_eq!(connections[0].partner_id, id("zed"));
    assert_eq!(connections[0].source, ConnectionSource::Declared);
}

#[test]
fn test_next_process_sees_declaration_despite_uncleared_layer() {
    let remote = SharedRemote::default();
    let first = OrgService::with_cache(roster(), QonnectConfig::default(), shared_cache(&remote));
    first.reload().unwrap();
    assert_eq!(
        first.get_connections(&id("alice")).unwrap()[0].source,
        ConnectionSource::Transitive
    );

    first
        .declare_connection(DeclaredConnection::new("alice", "zed", ConnectionStrength::Strong))
        .unwrap();
    assert_eq!(
        first.get_connections(&id("alice")).unwrap()[0].source,
        ConnectionSource::Declared
    );

    // A later process starts from the persisted declarations
    let persisted = StaticRoster::new(roster().load_employees().unwrap(), first.source().connections());
    let second = OrgService::with_cache(persisted, QonnectConfig::default(), shared_cache(&remote));
    second.reload().unwrap();

    let after = second.get_connections(&id("alice")).unwrap();
    assert_eq!(after[0].partner_id, id("zed"));
    assert_eq!(after[0].source, ConnectionSource::Declared);
}

#[test]
fn test_invalidation_reaches_next_process() {
    let remote = SharedRemote::default();
    let first = OrgService::with_cache(roster(), QonnectConfig::default(), shared_cache(&remote));
    first.reload().unwrap();
    first.get_connections(&id("alice")).unwrap();
    first.invalidate_caches();

    let second = OrgService::with_cache(roster(), QonnectConfig::default(), shared_cache(&remote));
    second.reload().unwrap();
    second.get_connections(&id("alice")).unwrap();
    assert_eq!(second.cache_stats().computations, 1);

    // Without an invalidation the same roster is served from the shared layer
    let third = OrgService::with_cache(roster(), QonnectConfig::default(), shared_cache(&remote));
    third.reload().unwrap();
    third.get_connections(&id("alice")).unwrap();
    assert_eq!(third.cache_stats().computations, 0);
}

#[tokio::test]
async fn test_refresh_worker_cycles() {
    let service = Arc::new(OrgService::new(roster(), QonnectConfig::default()));
    assert_eq!(service.snapshot().version(), 0);

    let mut worker = RefreshWorker::new(Arc::clone(&service), Duration::from_millis(10))
        .with_warm(WarmTargets::TopPrimary(2));
    worker.run_cycles(2).await.unwrap();

    assert_eq!(service.snapshot().version(), 2);
    let metrics = worker.metrics();
    assert_eq!(metrics.cycles, 2);
    assert_eq!(metrics.reloads, 2);
    assert_eq!(metrics.failures, 0);
    assert_eq!(metrics.warmed, 4);
}
