//! Bounds for graph walks and connection scans

use qonnect_domain::EmployeeId;
use serde::{Deserialize, Serialize};

/// Configuration for chain walks and connection resolution
///
/// Every walk in this crate is bounded by one of these limits, so a resolution
/// always terminates with a best-effort answer.
///
/// ```toml
/// [graph]
/// max_chain_depth = 20
/// max_bridges = 50
/// max_inferred_partners = 5
/// fallback_root = "ceo"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Maximum number of managers followed upward from any employee
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// Maximum number of bridge employees checked per transitive scan
    #[serde(default = "default_max_bridges")]
    pub max_bridges: usize,

    /// Number of Partner employees considered by the inferred scan
    #[serde(default = "default_max_inferred_partners")]
    pub max_inferred_partners: usize,

    /// Designated top-of-organisation record appended to chains that end on
    /// an unresolved manager reference
    #[serde(default)]
    pub fallback_root: Option<EmployeeId>,
}

fn default_max_chain_depth() -> usize {
    20
}

fn default_max_bridges() -> usize {
    50
}

fn default_max_inferred_partners() -> usize {
    5
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: default_max_chain_depth(),
            max_bridges: default_max_bridges(),
            max_inferred_partners: default_max_inferred_partners(),
            fallback_root: None,
        }
    }
}

impl GraphConfig {
    /// Set the fallback root
    pub fn with_fallback_root(mut self, root: impl AsRef<str>) -> Self {
        self.fallback_root = Some(EmployeeId::new(root));
        self
    }
}
