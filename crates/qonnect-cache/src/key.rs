//! Cache key derivation

use sha2::{Digest, Sha256};
use std::fmt;

/// Key for one cached operation result
///
/// Built from an operation name and its arguments, each trimmed and
/// lower-cased, and rendered as `op:arg1:arg2`.
///
/// ```
/// use qonnect_cache::CacheKey;
///
/// let key = CacheKey::new("path", [" Alice", "BOB"]);
/// assert_eq!(key.as_str(), "path:alice:bob");
/// assert_eq!(key.digest().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: String,
    rendered: String,
}

impl CacheKey {
    /// Build a key from an operation and its arguments
    pub fn new<I, S>(operation: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let operation = operation.trim().to_lowercase();
        let mut rendered = operation.clone();
        for arg in args {
            rendered.push(':');
            rendered.push_str(&arg.as_ref().trim().to_lowercase());
        }
        Self {
            operation,
            rendered,
        }
    }

    /// Operation name
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Rendered key
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// SHA-256 of the rendered key, hex encoded
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.rendered.as_bytes()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}
