//! Integration tests for qonnect-graph
//!
//! These tests drive whole snapshots through hierarchy views, path resolution
//! and connection resolution.

use qonnect_domain::{
    ConnectionSource, ConnectionStrength, DeclaredConnection, EmployeeId, EmployeeRecord,
    Population,
};
use qonnect_graph::{
    resolve_path, ChainOptions, ConnectionResolver, GraphConfig, HierarchyView, OrgSnapshot,
    PathMethod,
};

fn id(s: &str) -> EmployeeId {
    EmployeeId::new(s)
}

fn primary(id: &str, manager: Option<&str>) -> EmployeeRecord {
    let emp = EmployeeRecord::new(id, id.to_uppercase(), format!("{id}@corp.example"))
        .with_population(Population::Primary);
    match manager {
        Some(m) => emp.with_manager(format!("{m}@corp.example")),
        None => emp,
    }
}

fn partner(id: &str) -> EmployeeRecord {
    EmployeeRecord::new(id, id.to_uppercase(), format!("{id}@partner.example"))
        .with_population(Population::Partner)
}

#[test]
fn test_hierarchy_chain_and_path() {
    let snapshot = OrgSnapshot::build(
        1,
        vec![primary("a", Some("b")), primary("b", Some("c")), primary("c", None)],
        Vec::new(),
    );

    let view = HierarchyView::build(snapshot.roster(), &id("a"), 20).unwrap();
    let chain: Vec<&str> = view.manager_chain.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(chain, vec!["b", "c"]);
    assert_eq!(view.hierarchy_depth, 2);

    let path = resolve_path(snapshot.roster(), &id("a"), &id("c"), &ChainOptions::default());
    assert_eq!(path.intermediate_count, 2);
}

#[test]
fn test_hierarchy_view_counts_peers() {
    let snapshot = OrgSnapshot::build(
        1,
        vec![
            primary("m", None),
            primary("a", Some("m")),
            primary("b", Some("m")),
            primary("c", Some("m")),
        ],
        Vec::new(),
    );
    let view = HierarchyView::build(snapshot.roster(), &id("b"), 20).unwrap();
    assert_eq!(view.peer_count, 2);
    assert_eq!(view.total_reports, 0);

    let manager = HierarchyView::build(snapshot.roster(), &id("m"), 20).unwrap();
    assert_eq!(manager.total_reports, 3);
    assert!(HierarchyView::build(snapshot.roster(), &id("ghost"), 20).is_none());
}

#[test]
fn test_disjoint_chains_use_estimate() {
    // a -> x ; d -> y -> z ; no shared manager
    let snapshot = OrgSnapshot::build(
        1,
        vec![
            primary("a", Some("x")),
            primary("x", None),
            primary("d", Some("y")),
            primary("y", Some("z")),
            primary("z", None),
        ],
        Vec::new(),
    );
    let path = resolve_path(snapshot.roster(), &id("a"), &id("d"), &ChainOptions::default());
    assert_eq!(path.intermediate_count, 4);
    assert_eq!(path.method, PathMethod::Disconnected);
}

#[test]
fn test_fallback_root_joins_unresolved_chain() {
    let snapshot = OrgSnapshot::build(
        1,
        vec![
            primary("ceo", None),
            primary("vp", Some("ceo")),
            primary("a", Some("vp")),
            primary("lost", Some("departed")),
        ],
        Vec::new(),
    );
    let config = GraphConfig::default().with_fallback_root("ceo");
    let options = ChainOptions::from_config(&config);

    let path = resolve_path(snapshot.roster(), &id("lost"), &id("a"), &options);
    assert_eq!(path.method, PathMethod::CommonManager);
    assert_eq!(path.intermediate_count, 3);

    // The hierarchy view never applies the fallback
    let view = HierarchyView::build(snapshot.roster(), &id("lost"), 20).unwrap();
    assert!(view.manager_chain.is_empty());
}

#[test]
fn test_transitive_connection_via_manager() {
    let snapshot = OrgSnapshot::build(
        1,
        vec![primary("y", None), primary("x", Some("y")), partner("z")],
        vec![DeclaredConnection::new("y", "z", ConnectionStrength::Strong)],
    );
    let config = GraphConfig {
        max_inferred_partners: 0,
        ..GraphConfig::default()
    };

    let connections = ConnectionResolver::new(&snapshot, &config).resolve(&id("x"));
    assert_eq!(connections.len(), 1);

    let entry = &connections[0];
    assert_eq!(entry.partner_id, id("z"));
    assert_eq!(entry.source, ConnectionSource::Transitive);
    assert_eq!(entry.via, Some(id("y")));
    assert_eq!(entry.strength, ConnectionStrength::Strong);

    let distance = resolve_path(snapshot.roster(), &id("x"), &id("y"), &ChainOptions::default());
    assert_eq!(entry.path_length, distance.intermediate_count);
    assert_eq!(entry.path_length, 1);
}

#[test]
fn test_declared_weak_beaten_by_inferred_medium() {
    let snapshot = OrgSnapshot::build(
        1,
        vec![
            primary("x", None).with_department("Payments"),
            partner("z").with_department("Payments"),
        ],
        vec![DeclaredConnection::new("x", "z", ConnectionStrength::Weak)],
    );
    let config = GraphConfig::default();

    let connections = ConnectionResolver::new(&snapshot, &config).resolve(&id("x"));
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].path_length, 1);
    assert_eq!(connections[0].source, ConnectionSource::Inferred);
    assert_eq!(connections[0].strength, ConnectionStrength::Medium);
}

#[test]
fn test_declared_connections_skip_transitive() {
    let snapshot = OrgSnapshot::build(
        1,
        vec![
            primary("m", None),
            primary("x", Some("m")),
            primary("y", Some("m")),
            partner("z1"),
            partner("z2"),
        ],
        vec![
            DeclaredConnection::new("x", "z1", ConnectionStrength::Strong),
            DeclaredConnection::new("y", "z2", ConnectionStrength::Strong),
        ],
    );
    let config = GraphConfig {
        max_inferred_partners: 0,
        ..GraphConfig::default()
    };

    let connections = ConnectionResolver::new(&snapshot, &config).resolve(&id("x"));
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].partner_id, id("z1"));
    assert_eq!(connections[0].path_length, 0);
    assert_eq!(connections[0].source, ConnectionSource::Declared);
}

#[test]
fn test_inferred_partner_in_management_chain_is_strong() {
    let snapshot = OrgSnapshot::build(
        1,
        vec![
            partner("boss"),
            primary("x", None)
                .with_manager("boss@partner.example")
                .with_department("Ops"),
            partner("far").with_department("Legal"),
        ],
        Vec::new(),
    );
    let config = GraphConfig::default();

    let connections = ConnectionResolver::new(&snapshot, &config).resolve(&id("x"));
    assert_eq!(connections.len(), 2);

    let boss = connections.iter().find(|c| c.partner_id == id("boss")).unwrap();
    assert_eq!(boss.strength, ConnectionStrength::Strong);
    assert_eq!(boss.path_length, 0);

    let far = connections.iter().find(|c| c.partner_id == id("far")).unwrap();
    assert_eq!(far.strength, ConnectionStrength::Weak);
    let path: Vec<&str> = far.path.iter().map(|p| p.as_str()).collect();
    assert_eq!(path, vec!["x", "boss", "far"]);
}

#[test]
fn test_bridge_scan_is_bounded() {
    let mut employees = vec![primary("x", None).with_department("Solo"), partner("z")];
    let mut connections = Vec::new();
    for i in 0..10 {
        let bridge = format!("b{i}");
        employees.push(primary(&bridge, None).with_department("Solo"));
        connections.push(DeclaredConnection::new(&bridge, "z", ConnectionStrength::Medium));
    }
    let snapshot = OrgSnapshot::build(1, employees, connections);
    let config = GraphConfig {
        max_bridges: 0,
        max_inferred_partners: 0,
        ..GraphConfig::default()
    };

    let connections = ConnectionResolver::new(&snapshot, &config).resolve(&id("x"));
    assert!(connections.is_empty());
}

#[test]
fn test_self_report_never_own_manager() {
    let snapshot = OrgSnapshot::build(
        1,
        vec![EmployeeRecord::new("me", "Me", "Me@corp.example").with_manager("me@CORP.example")],
        Vec::new(),
    );
    let me = snapshot.roster().get(&id("me")).unwrap();
    assert!(me.manager_info.is_none());
    assert!(me.reportees.is_empty());
    assert_eq!(snapshot.roster().hierarchy_report().self_reports, 1);
}
