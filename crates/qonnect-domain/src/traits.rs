//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{DeclaredConnection, EmployeeRecord};

/// Trait for loading the roster and recording declarations
///
/// Implemented by the service layer (qonnect-service). Spreadsheet or
/// database ingestion is expected to sit behind this trait.
pub trait RosterSource {
    /// Error type for source operations
    type Error: std::fmt::Display;

    /// Load every employee record (hierarchy fields are ignored)
    fn load_employees(&self) -> Result<Vec<EmployeeRecord>, Self::Error>;

    /// Load every declared connection
    fn load_connections(&self) -> Result<Vec<DeclaredConnection>, Self::Error>;

    /// Persist a newly declared connection
    fn record_connection(&self, connection: &DeclaredConnection) -> Result<(), Self::Error>;
}
