//! Declared-connection ledger
//!
//! Append-only store of Primary → Partner declarations, indexed by the
//! declaring employee. Declarations that do not fit the population rules are
//! rejected when the ledger is built, so resolvers can trust every entry.

use crate::roster::Roster;
use qonnect_domain::{DeclaredConnection, EmployeeId, Population};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

/// Why a declaration was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerRejection {
    /// The declaring employee is not in the roster
    #[error("Unknown declaring employee: {0}")]
    UnknownFrom(EmployeeId),

    /// The target employee is not in the roster
    #[error("Unknown target employee: {0}")]
    UnknownTo(EmployeeId),

    /// The declaring employee is not in the Primary population
    #[error("{0} is not in the primary population")]
    FromNotPrimary(EmployeeId),

    /// The target employee is not in the Partner population
    #[error("{0} is not in the partner population")]
    ToNotPartner(EmployeeId),
}

/// Declared connections grouped by declaring employee
#[derive(Debug, Clone, Default)]
pub struct ConnectionLedger {
    connections: Vec<DeclaredConnection>,
    by_from: HashMap<EmployeeId, Vec<usize>>,
    bridges: Vec<EmployeeId>,
}

impl ConnectionLedger {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger, dropping declarations that fail [`Self::validate`]
    pub fn build(roster: &Roster, connections: Vec<DeclaredConnection>) -> Self {
        let mut ledger = Self::new();
        let mut rejected = 0usize;

        for connection in connections {
            match Self::validate(roster, &connection) {
                Ok(()) => ledger.push(connection),
                Err(reason) => {
                    rejected += 1;
                    warn!(
                        from = %connection.from_id,
                        to = %connection.to_id,
                        reason = %reason,
                        "Dropping declared connection"
                    );
                }
            }
        }

        info!(
            accepted = ledger.len(),
            rejected,
            bridges = ledger.bridges.len(),
            "Connection ledger built"
        );
        ledger
    }

    /// Check a declaration against the roster's populations
    pub fn validate(roster: &Roster, connection: &DeclaredConnection) -> Result<(), LedgerRejection> {
        let from = roster
            .get(&connection.from_id)
            .ok_or_else(|| LedgerRejection::UnknownFrom(connection.from_id.clone()))?;
        let to = roster
            .get(&connection.to_id)
            .ok_or_else(|| LedgerRejection::UnknownTo(connection.to_id.clone()))?;

        if from.population != Population::Primary {
            return Err(LedgerRejection::FromNotPrimary(from.id.clone()));
        }
        if to.population != Population::Partner {
            return Err(LedgerRejection::ToNotPartner(to.id.clone()));
        }
        Ok(())
    }

    /// Append a declaration that has already been validated
    pub fn push(&mut self, connection: DeclaredConnection) {
        let idx = self.connections.len();
        let entry = self.by_from.entry(connection.from_id.clone()).or_default();
        if entry.is_empty() {
            self.bridges.push(connection.from_id.clone());
        }
        entry.push(idx);
        self.connections.push(connection);
    }

    /// Declarations made by `id`, in declaration order
    pub fn declared_by(&self, id: &EmployeeId) -> impl Iterator<Item = &DeclaredConnection> {
        self.by_from
            .get(id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.connections[idx])
    }

    /// Employees with at least one declaration, in first-declaration order
    pub fn bridges(&self) -> impl Iterator<Item = &EmployeeId> {
        self.bridges.iter()
    }

    /// Every declaration in order
    pub fn iter(&self) -> impl Iterator<Item = &DeclaredConnection> {
        self.connections.iter()
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// True when nothing has been declared
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qonnect_domain::{ConnectionStrength, EmployeeRecord};

    fn roster() -> Roster {
        Roster::build(vec![
            EmployeeRecord::new("p1", "P1", "p1@x").with_population(Population::Primary),
            EmployeeRecord::new("p2", "P2", "p2@x").with_population(Population::Primary),
            EmployeeRecord::new("z1", "Z1", "z1@x").with_population(Population::Partner),
            EmployeeRecord::new("o1", "O1", "o1@x"),
        ])
    }

    #[test]
    fn test_invalid_declarations_dropped() {
        let roster = roster();
        let ledger = ConnectionLedger::build(
            &roster,
            vec![
                DeclaredConnection::new("p1", "z1", ConnectionStrength::Strong),
                DeclaredConnection::new("z1", "p1", ConnectionStrength::Strong),
                DeclaredConnection::new("p1", "o1", ConnectionStrength::Weak),
                DeclaredConnection::new("ghost", "z1", ConnectionStrength::Weak),
                DeclaredConnection::new("p2", "z1", ConnectionStrength::Medium),
                DeclaredConnection::new("p1", "z1", ConnectionStrength::Weak),
            ],
        );

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.declared_by(&EmployeeId::new("p1")).count(), 2);
        let bridges: Vec<&str> = ledger.bridges().map(|b| b.as_str()).collect();
        assert_eq!(bridges, vec!["p1", "p2"]);
    }

    #[test]
    fn test_validate_reasons() {
        let roster = roster();
        let err = ConnectionLedger::validate(
            &roster,
            &DeclaredConnection::new("p1", "p2", ConnectionStrength::Weak),
        )
        .unwrap_err();
        assert_eq!(err, LedgerRejection::ToNotPartner(EmployeeId::new("p2")));
    }
}
