//! Immutable, versioned view of roster plus ledger
//!
//! Resolvers only ever read a snapshot. A reload or a new declaration builds a
//! fresh snapshot and swaps it in; readers holding the old one are unaffected.

use crate::ledger::{ConnectionLedger, LedgerRejection};
use crate::roster::Roster;
use qonnect_domain::{DeclaredConnection, EmployeeRecord};
use std::sync::Arc;

/// Roster and connection ledger at one point in time
#[derive(Debug, Clone)]
pub struct OrgSnapshot {
    version: u64,
    fingerprint: String,
    roster: Arc<Roster>,
    ledger: Arc<ConnectionLedger>,
}

impl OrgSnapshot {
    /// Build the roster, run the hierarchy build and validate connections
    pub fn build(
        version: u64,
        employees: Vec<EmployeeRecord>,
        connections: Vec<DeclaredConnection>,
    ) -> Self {
        let roster = Roster::build(employees);
        let ledger = ConnectionLedger::build(&roster, connections);
        Self {
            version,
            fingerprint: format!("v{version}"),
            roster: Arc::new(roster),
            ledger: Arc::new(ledger),
        }
    }

    /// Snapshot with nothing loaded
    pub fn empty() -> Self {
        Self {
            version: 0,
            fingerprint: "v0".to_string(),
            roster: Arc::new(Roster::empty()),
            ledger: Arc::new(ConnectionLedger::new()),
        }
    }

    /// Monotonic version, bumped on every swap
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Identity of the snapshot's content for cache keys
    ///
    /// Defaults to `v{version}`; loaders that can hash their input replace it
    /// with [`OrgSnapshot::with_fingerprint`].
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Same snapshot under a different fingerprint
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    /// Indexed roster
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Declared connections
    pub fn ledger(&self) -> &ConnectionLedger {
        &self.ledger
    }

    /// New snapshot with one more declaration; the roster is shared
    pub fn with_connection(&self, connection: DeclaredConnection) -> Result<Self, LedgerRejection> {
        ConnectionLedger::validate(&self.roster, &connection)?;
        let mut ledger = (*self.ledger).clone();
        ledger.push(connection);
        let version = self.version + 1;
        Ok(Self {
            version,
            fingerprint: format!("v{version}"),
            roster: Arc::clone(&self.roster),
            ledger: Arc::new(ledger),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qonnect_domain::{ConnectionStrength, EmployeeId, Population};

    #[test]
    fn test_with_connection_leaves_original_untouched() {
        let snapshot = OrgSnapshot::build(
            1,
            vec![
                EmployeeRecord::new("p", "P", "p@x").with_population(Population::Primary),
                EmployeeRecord::new("z", "Z", "z@x").with_population(Population::Partner),
            ],
            Vec::new(),
        );

        let next = snapshot
            .with_connection(DeclaredConnection::new("p", "z", ConnectionStrength::Strong))
            .unwrap();

        assert_eq!(next.version(), 2);
        assert_eq!(next.fingerprint(), "v2");
        assert_eq!(next.ledger().len(), 1);
        assert!(snapshot.ledger().is_empty());
        assert!(next.roster().contains(&EmployeeId::new("z")));
    }

    #[test]
    fn test_fingerprint_override() {
        let snapshot = OrgSnapshot::build(3, Vec::new(), Vec::new());
        assert_eq!(snapshot.fingerprint(), "v3");
        let named = snapshot.with_fingerprint("abc123");
        assert_eq!(named.fingerprint(), "abc123");
        assert_eq!(named.version(), 3);
    }

    #[test]
    fn test_with_connection_rejects_reversed() {
        let snapshot = OrgSnapshot::build(
            1,
            vec![
                EmployeeRecord::new("p", "P", "p@x").with_population(Population::Primary),
                EmployeeRecord::new("z", "Z", "z@x").with_population(Population::Partner),
            ],
            Vec::new(),
        );
        assert!(snapshot
            .with_connection(DeclaredConnection::new("z", "p", ConnectionStrength::Weak))
            .is_err());
    }
}
