//! Connection resolution
//!
//! Answers "which Partner employees does this employee connect to, and how
//! strongly?" in three steps over one snapshot:
//!
//! 1. **Declared**: the employee's own declarations, path length from strength.
//! 2. **Transitive**: only when step 1 found nothing. Other declaring
//!    employees (bridges) that are organisationally reachable lend their
//!    declarations; path length is the path distance to the bridge.
//! 3. **Inferred**: always. The first few Partner employees are graded by
//!    where they sit relative to the employee's manager chain.
//!
//! Candidates are then reduced to one entry per partner, keeping the shortest
//! path length (first seen wins ties) in first-appearance order.

use crate::chain::{manager_chain, ChainOptions, ManagerChain};
use crate::config::GraphConfig;
use crate::path::resolve_between;
use crate::snapshot::OrgSnapshot;
use qonnect_domain::{
    ConnectionSource, ConnectionStrength, EmployeeId, EmployeeRecord, Population,
    ResolvedConnection,
};
use std::collections::HashMap;
use tracing::debug;

/// How a bridge employee is reachable from the requester
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// Same direct manager
    SameManager,

    /// The bridge manages the requester, directly or indirectly
    BridgeAbove,

    /// The requester manages the bridge, directly or indirectly
    BridgeBelow,

    /// The two chains share a manager
    SharedManager,

    /// Same department
    SameDepartment,

    /// Same population
    SamePopulation,
}

impl Reachability {
    /// Get the reachability name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Reachability::SameManager => "same manager",
            Reachability::BridgeAbove => "in management chain",
            Reachability::BridgeBelow => "reports into requester",
            Reachability::SharedManager => "shared manager",
            Reachability::SameDepartment => "same department",
            Reachability::SamePopulation => "same population",
        }
    }

    /// Check the reachability rules in order
    pub fn between(
        employee: &EmployeeRecord,
        employee_chain: &ManagerChain,
        bridge: &EmployeeRecord,
        bridge_chain: &ManagerChain,
    ) -> Option<Self> {
        if let (Some(a), Some(b)) = (employee_chain.direct_manager(), bridge_chain.direct_manager()) {
            if a == b {
                return Some(Reachability::SameManager);
            }
        }
        if employee_chain.contains(&bridge.id) {
            return Some(Reachability::BridgeAbove);
        }
        if bridge_chain.contains(&employee.id) {
            return Some(Reachability::BridgeBelow);
        }
        if employee_chain.ids.iter().any(|m| bridge_chain.contains(m)) {
            return Some(Reachability::SharedManager);
        }
        if !employee.department.is_empty() && employee.department == bridge.department {
            return Some(Reachability::SameDepartment);
        }
        if employee.population == bridge.population {
            return Some(Reachability::SamePopulation);
        }
        None
    }
}

/// Resolves connections for employees of one snapshot
pub struct ConnectionResolver<'a> {
    snapshot: &'a OrgSnapshot,
    config: &'a GraphConfig,
    chain_options: ChainOptions,
}

impl<'a> ConnectionResolver<'a> {
    /// Create a resolver over a snapshot
    pub fn new(snapshot: &'a OrgSnapshot, config: &'a GraphConfig) -> Self {
        Self {
            snapshot,
            config,
            chain_options: ChainOptions::from_config(config),
        }
    }

    /// Resolve every Partner connection of `employee_id`
    ///
    /// Returns an empty list when the employee is unknown; callers that need
    /// to distinguish that case check the roster first.
    pub fn resolve(&self, employee_id: &EmployeeId) -> Vec<ResolvedConnection> {
        let roster = self.snapshot.roster();
        let Some(employee) = roster.get(employee_id) else {
            return Vec::new();
        };
        let chain = manager_chain(roster, employee_id, &self.chain_options);

        let mut candidates = self.declared(employee);
        let declared = candidates.len();

        if candidates.is_empty() {
            candidates.extend(self.transitive(employee, &chain));
        }
        let transitive = candidates.len() - declared;

        candidates.extend(self.inferred(employee, &chain));

        let resolved = dedup_by_partner(candidates);
        debug!(
            employee = %employee_id,
            declared,
            transitive,
            resolved = resolved.len(),
            "Connections resolved"
        );
        resolved
    }

    fn declared(&self, employee: &EmployeeRecord) -> Vec<ResolvedConnection> {
        let roster = self.snapshot.roster();
        self.snapshot
            .ledger()
            .declared_by(&employee.id)
            .filter_map(|c| {
                let partner = roster.get(&c.to_id)?;
                Some(ResolvedConnection {
                    partner_id: partner.id.clone(),
                    partner_name: partner.name.clone(),
                    strength: c.strength,
                    path_length: c.strength.path_length(),
                    source: ConnectionSource::Declared,
                    via: None,
                    path: vec![employee.id.clone(), partner.id.clone()],
                    notes: c.notes.clone(),
                })
            })
            .collect()
    }

    fn transitive(&self, employee: &EmployeeRecord, chain: &ManagerChain) -> Vec<ResolvedConnection> {
        let roster = self.snapshot.roster();
        let ledger = self.snapshot.ledger();
        let mut found = Vec::new();

        let bridges = ledger
            .bridges()
            .filter(|b| **b != employee.id)
            .take(self.config.max_bridges);

        for bridge_id in bridges {
            let Some(bridge) = roster.get(bridge_id) else {
                continue;
            };
            if bridge.population != Population::Primary {
                continue;
            }

            let bridge_chain = manager_chain(roster, bridge_id, &self.chain_options);
            let Some(reach) = Reachability::between(employee, chain, bridge, &bridge_chain) else {
                continue;
            };
            let distance = resolve_between(&employee.id, bridge_id, chain, &bridge_chain).intermediate_count;

            for c in ledger.declared_by(bridge_id) {
                let Some(partner) = roster.get(&c.to_id) else {
                    continue;
                };
                if partner.id == employee.id {
                    continue;
                }
                found.push(ResolvedConnection {
                    partner_id: partner.id.clone(),
                    partner_name: partner.name.clone(),
                    strength: c.strength,
                    path_length: distance,
                    source: ConnectionSource::Transitive,
                    via: Some(bridge.id.clone()),
                    path: vec![employee.id.clone(), bridge.id.clone(), partner.id.clone()],
                    notes: format!("via {} ({})", bridge.name, reach.as_str()),
                });
            }
        }

        found
    }

    fn inferred(&self, employee: &EmployeeRecord, chain: &ManagerChain) -> Vec<ResolvedConnection> {
        self.snapshot
            .roster()
            .population(Population::Partner)
            .filter(|p| p.id != employee.id)
            .take(self.config.max_inferred_partners)
            .map(|partner| {
                let (strength, path, notes) = if let Some(pos) = chain.position(&partner.id) {
                    let mut path = vec![employee.id.clone()];
                    path.extend(chain.ids[..=pos].iter().cloned());
                    (ConnectionStrength::Strong, path, "in management chain")
                } else if !partner.department.is_empty() && partner.department == employee.department {
                    (
                        ConnectionStrength::Medium,
                        vec![employee.id.clone(), partner.id.clone()],
                        "same department",
                    )
                } else {
                    let mut path = vec![employee.id.clone()];
                    path.extend(chain.direct_manager().cloned());
                    path.push(partner.id.clone());
                    (ConnectionStrength::Weak, path, "organisational proximity")
                };

                ResolvedConnection {
                    partner_id: partner.id.clone(),
                    partner_name: partner.name.clone(),
                    strength,
                    path_length: strength.path_length(),
                    source: ConnectionSource::Inferred,
                    via: None,
                    path,
                    notes: notes.to_string(),
                }
            })
            .collect()
    }
}

/// Keep one entry per partner: shortest path length, first seen on ties
fn dedup_by_partner(candidates: Vec<ResolvedConnection>) -> Vec<ResolvedConnection> {
    let mut best: Vec<ResolvedConnection> = Vec::with_capacity(candidates.len());
    let mut index: HashMap<EmployeeId, usize> = HashMap::new();

    for candidate in candidates {
        match index.get(&candidate.partner_id) {
            Some(&i) => {
                if candidate.path_length < best[i].path_length {
                    best[i] = candidate;
                }
            }
            None => {
                index.insert(candidate.partner_id.clone(), best.len());
                best.push(candidate);
            }
        }
    }

    best
}
