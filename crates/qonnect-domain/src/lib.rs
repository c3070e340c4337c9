//! Qonnect Domain Layer
//!
//! This crate contains the value objects and seam traits shared by every other
//! Qonnect crate. It performs no I/O; its only dependency is `serde`, because
//! every derived result must be storable in the durable cache layers.
//!
//! ## Key Concepts
//!
//! - **Employee**: one roster record, identified by a case-insensitive id
//! - **Population**: the closed set of groups an employee belongs to
//!   (Primary initiates lookups, Partner is connected to)
//! - **Declared connection**: an explicit Primary → Partner edge with a strength
//! - **Resolved connection**: the query-time answer for one (employee, partner) pair
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture:
//! - Pure data and small invariants only
//! - Graph algorithms live in `qonnect-graph`
//! - Infrastructure (caches, loaders) lives in other crates
//! - Trait definitions for the roster loader seam

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod employee;
pub mod population;
pub mod traits;

// Re-exports for convenience
pub use connection::{
    ConnectionSource, ConnectionStrength, DeclaredConnection, ResolvedConnection,
};
pub use employee::{normalize_email, EmployeeId, EmployeeRecord, EmployeeRef};
pub use population::Population;
pub use traits::RosterSource;
