//! Property tests over randomly generated organisations
//!
//! Each generated employee picks an optional manager among all employees
//! (itself included), so cycles, self-reports and forests all show up.

use proptest::prelude::*;
use qonnect_domain::{
    ConnectionStrength, DeclaredConnection, EmployeeId, EmployeeRecord, Population,
};
use qonnect_graph::{resolve_path, ChainOptions, ConnectionResolver, GraphConfig, OrgSnapshot};
use std::collections::HashSet;

#[derive(Debug, Clone)]
struct Org {
    employees: Vec<EmployeeRecord>,
    connections: Vec<DeclaredConnection>,
}

fn org() -> impl Strategy<Value = Org> {
    (2usize..24).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::option::of(0..n), n),
            prop::collection::vec(0u8..3, n),
            prop::collection::vec(0u8..3, n),
            prop::collection::vec((0..n, 0..n, 0u8..3), 0..12),
        )
            .prop_map(move |(managers, populations, departments, edges)| {
                let employees: Vec<EmployeeRecord> = (0..n)
                    .map(|i| {
                        let population = match populations[i] {
                            0 => Population::Primary,
                            1 => Population::Partner,
                            _ => Population::Other,
                        };
                        let mut emp = EmployeeRecord::new(format!("e{i}"), format!("E{i}"), format!("e{i}@x"))
                            .with_population(population)
                            .with_department(format!("d{}", departments[i]));
                        if let Some(m) = managers[i] {
                            emp = emp.with_manager(format!("e{m}@x"));
                        }
                        emp
                    })
                    .collect();

                let connections = edges
                    .into_iter()
                    .map(|(from, to, s)| {
                        let strength = match s {
                            0 => ConnectionStrength::Weak,
                            1 => ConnectionStrength::Medium,
                            _ => ConnectionStrength::Strong,
                        };
                        DeclaredConnection::new(format!("e{from}"), format!("e{to}"), strength)
                    })
                    .collect();

                Org {
                    employees,
                    connections,
                }
            })
    })
}

proptest! {
    #[test]
    fn path_to_self_is_zero(org in org()) {
        let snapshot = OrgSnapshot::build(1, org.employees, org.connections);
        let options = ChainOptions::default();
        for emp in snapshot.roster().iter() {
            prop_assert_eq!(resolve_path(snapshot.roster(), &emp.id, &emp.id, &options).intermediate_count, 0);
        }
    }

    #[test]
    fn manager_links_are_one_hop(org in org()) {
        let snapshot = OrgSnapshot::build(1, org.employees, org.connections);
        let roster = snapshot.roster();
        let options = ChainOptions::default();
        for emp in roster.iter() {
            if let Some(manager) = &emp.manager_info {
                prop_assert_ne!(&manager.id, &emp.id);
                prop_assert_eq!(resolve_path(roster, &emp.id, &manager.id, &options).intermediate_count, 1);
                prop_assert_eq!(resolve_path(roster, &manager.id, &emp.id, &options).intermediate_count, 1);
            }
        }
    }

    #[test]
    fn siblings_are_two_hops(org in org()) {
        let snapshot = OrgSnapshot::build(1, org.employees, org.connections);
        let roster = snapshot.roster();
        let options = ChainOptions::default();
        for manager in roster.iter() {
            for a in &manager.reportees {
                for b in &manager.reportees {
                    if a.id == b.id {
                        continue;
                    }
                    prop_assert_eq!(resolve_path(roster, &a.id, &b.id, &options).intermediate_count, 2);
                }
            }
        }
    }

    #[test]
    fn path_count_matches_path_length(org in org(), i in 0usize..24, j in 0usize..24) {
        let snapshot = OrgSnapshot::build(1, org.employees, org.connections);
        let from = EmployeeId::new(format!("e{i}"));
        let to = EmployeeId::new(format!("e{j}"));
        let path = resolve_path(snapshot.roster(), &from, &to, &ChainOptions::default());
        prop_assert_eq!(path.intermediate_count as usize, path.path.len() - 1);
        prop_assert_eq!(path.path.first(), Some(&from));
        prop_assert_eq!(path.path.last(), Some(&to));
    }

    #[test]
    fn connections_unique_per_partner(org in org()) {
        let snapshot = OrgSnapshot::build(1, org.employees, org.connections);
        let config = GraphConfig::default();
        let resolver = ConnectionResolver::new(&snapshot, &config);
        for emp in snapshot.roster().iter() {
            let connections = resolver.resolve(&emp.id);
            let mut seen = HashSet::new();
            for c in &connections {
                prop_assert!(seen.insert(c.partner_id.clone()));
                prop_assert_ne!(&c.partner_id, &emp.id);
            }
        }
    }

    #[test]
    fn hierarchy_never_self_assigns(org in org()) {
        let snapshot = OrgSnapshot::build(1, org.employees, org.connections);
        for emp in snapshot.roster().iter() {
            if let Some(m) = &emp.manager_info {
                prop_assert_ne!(&m.id, &emp.id);
            }
            let mut ids = HashSet::new();
            for r in &emp.reportees {
                prop_assert!(ids.insert(r.id.clone()));
            }
        }
    }
}
