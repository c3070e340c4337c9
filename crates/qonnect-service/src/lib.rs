//! Qonnect Service
//!
//! Wires the roster source, graph resolvers and tiered cache into one facade,
//! [`OrgService`], that answers the three core questions:
//!
//! - where does an employee sit in the hierarchy ([`OrgService::get_hierarchy`]);
//! - how far apart are two employees ([`OrgService::get_organizational_path`]);
//! - which Partner employees can a Primary employee reach
//!   ([`OrgService::get_connections`]).
//!
//! Results are cached per snapshot version and every cache layer is dropped
//! whenever the roster or the connection ledger changes. [`RefreshWorker`]
//! reloads the roster on a schedule.
//!
//! # Examples
//!
//! ```
//! use qonnect_domain::{EmployeeId, EmployeeRecord, Population};
//! use qonnect_service::{OrgService, QonnectConfig, StaticRoster};
//!
//! let source = StaticRoster::new(
//!     vec![
//!         EmployeeRecord::new("alice", "Alice", "alice@corp.example")
//!             .with_manager("bob@corp.example")
//!             .with_population(Population::Primary),
//!         EmployeeRecord::new("bob", "Bob", "bob@corp.example")
//!             .with_population(Population::Primary),
//!     ],
//!     vec![],
//! );
//! let service = OrgService::open(source, QonnectConfig::default()).unwrap();
//!
//! let view = service.get_hierarchy(&EmployeeId::new("alice")).unwrap();
//! assert_eq!(view.hierarchy_depth, 1);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod service;
pub mod source;
pub mod warm;
pub mod worker;

pub use config::{ConfigError, QonnectConfig, RosterConfig, WarmConfig};
pub use error::ServiceError;
pub use service::{build_cache, OrgService, ReloadReport, ServiceStats};
pub use source::{JsonRosterSource, JsonSourceError, StaticRoster};
pub use warm::{WarmCheckpoint, WarmReport, WarmTargets};
pub use worker::{RefreshMetrics, RefreshWorker};
