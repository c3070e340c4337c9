//! Error types for cache layers

use thiserror::Error;

/// Errors raised by a single cache layer
///
/// These never escape [`crate::TieredCache`]; they are logged and counted
/// there and the layer is treated as a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The layer could not be reached (network, timeout, unexpected status)
    #[error("Cache layer unavailable: {0}")]
    Unavailable(String),

    /// The layer's storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// An entry could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}
