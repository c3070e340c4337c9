//! Service error types

use qonnect_domain::EmployeeId;
use qonnect_graph::LedgerRejection;
use thiserror::Error;

/// Errors surfaced to callers of the service
///
/// Cache-layer failures never appear here; they degrade to recomputation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested employee is not in the roster
    #[error("Employee not found: {0}")]
    NotFound(EmployeeId),

    /// A declaration failed validation
    #[error("Invalid connection: {0}")]
    InvalidConnection(#[from] LedgerRejection),

    /// The roster source failed to load or persist
    #[error("Roster source error: {0}")]
    Source(String),

    /// A background task panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),
}
