//! Qonnect Organisation Graph
//!
//! Builds an in-memory organisation graph from a flat roster and answers two
//! questions over it:
//!
//! - how far apart, organisationally, are two employees ([`path`]);
//! - which Partner employees a given employee connects to, and how strongly
//!   ([`connections`]).
//!
//! # Architecture
//!
//! ```text
//! Vec<EmployeeRecord> ──► Roster::build ──► hierarchy::build_hierarchy
//!                              │
//! Vec<DeclaredConnection> ──► ConnectionLedger::build
//!                              │
//!                              ▼
//!                         OrgSnapshot (immutable, versioned)
//!                              │
//!              ┌───────────────┼────────────────┐
//!              ▼               ▼                ▼
//!       HierarchyView    path::resolve_path   ConnectionResolver
//!              └──── chain::manager_chain (shared) ────┘
//! ```
//!
//! Everything here is synchronous and read-only once a snapshot is built, so
//! resolutions can run concurrently without locking. The organisation is
//! assumed to be a forest; self-reports, unresolved managers and cycles are
//! tolerated and logged, never raised.
//!
//! # Examples
//!
//! ```
//! use qonnect_domain::{EmployeeId, EmployeeRecord};
//! use qonnect_graph::{resolve_path, ChainOptions, OrgSnapshot};
//!
//! let snapshot = OrgSnapshot::build(
//!     1,
//!     vec![
//!         EmployeeRecord::new("a", "A", "a@corp.example").with_manager("b@corp.example"),
//!         EmployeeRecord::new("b", "B", "b@corp.example").with_manager("c@corp.example"),
//!         EmployeeRecord::new("c", "C", "c@corp.example"),
//!     ],
//!     Vec::new(),
//! );
//!
//! let path = resolve_path(
//!     snapshot.roster(),
//!     &EmployeeId::new("a"),
//!     &EmployeeId::new("c"),
//!     &ChainOptions::default(),
//! );
//! assert_eq!(path.intermediate_count, 2);
//! ```

#![warn(missing_docs)]

pub mod chain;
pub mod config;
pub mod connections;
pub mod hierarchy;
pub mod ledger;
pub mod path;
pub mod roster;
pub mod search;
pub mod snapshot;
pub mod stats;

pub use chain::{manager_chain, ChainEnd, ChainOptions, ManagerChain};
pub use config::GraphConfig;
pub use connections::{ConnectionResolver, Reachability};
pub use hierarchy::{build_hierarchy, HierarchyReport, HierarchyView};
pub use ledger::{ConnectionLedger, LedgerRejection};
pub use path::{resolve_path, OrgPath, PathMethod, UNKNOWN_EMPLOYEE_DISTANCE};
pub use roster::Roster;
pub use search::{SearchHit, SearchOptions, MIN_QUERY_LEN};
pub use snapshot::OrgSnapshot;
pub use stats::{ConnectionStats, RosterStats, RECENT_WINDOW_SECS};
