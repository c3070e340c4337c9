//! Ancestor-chain primitive
//!
//! Every hierarchy view, path resolution and reachability check goes through
//! [`manager_chain`], so the cycle guard and depth cap live in one place.

use crate::config::GraphConfig;
use crate::roster::Roster;
use qonnect_domain::EmployeeId;
use std::collections::HashSet;
use tracing::debug;

/// Why a chain walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    /// Reached an employee with no manager reference
    Root,

    /// Reached an employee whose manager reference resolves to nobody
    Unresolved,

    /// The next manager had already been visited
    Cycle,

    /// Stopped at the maximum depth
    DepthCap,

    /// The starting id is not in the roster
    UnknownStart,
}

/// Options for a chain walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOptions {
    /// Maximum number of managers to collect
    pub max_depth: usize,

    /// Appended when the walk ends on an unresolved manager reference
    pub fallback_root: Option<EmployeeId>,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self::from_config(&GraphConfig::default())
    }
}

impl ChainOptions {
    /// Options matching a graph configuration
    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            max_depth: config.max_chain_depth,
            fallback_root: config.fallback_root.clone(),
        }
    }

    /// Options that never append a fallback root
    pub fn without_fallback(max_depth: usize) -> Self {
        Self {
            max_depth,
            fallback_root: None,
        }
    }
}

/// Managers of one employee, nearest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerChain {
    /// Manager ids from the direct manager upward; never contains the start
    pub ids: Vec<EmployeeId>,

    /// Why the walk stopped
    pub end: ChainEnd,

    /// True when the fallback root was appended
    pub fallback_applied: bool,
}

impl ManagerChain {
    /// Position of `id` in the chain (0 = direct manager)
    pub fn position(&self, id: &EmployeeId) -> Option<usize> {
        self.ids.iter().position(|m| m == id)
    }

    /// True when `id` is somewhere above the start
    pub fn contains(&self, id: &EmployeeId) -> bool {
        self.ids.contains(id)
    }

    /// Direct manager, if any
    pub fn direct_manager(&self) -> Option<&EmployeeId> {
        self.ids.first()
    }

    /// Number of managers collected
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no manager was collected
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Walk upward from `start` through resolved managers
///
/// The walk stops on the first of: an employee with no manager, an unresolved
/// manager reference, a revisited id, or `max_depth` managers collected. When
/// it stops on an unresolved reference and a fallback root is configured, the
/// root is appended unless it is unknown or already on the chain.
pub fn manager_chain(roster: &Roster, start: &EmployeeId, options: &ChainOptions) -> ManagerChain {
    let Some(mut current) = roster.get(start) else {
        return ManagerChain {
            ids: Vec::new(),
            end: ChainEnd::UnknownStart,
            fallback_applied: false,
        };
    };

    let mut visited: HashSet<&EmployeeId> = HashSet::from([&current.id]);
    let mut ids = Vec::new();

    let end = loop {
        if ids.len() >= options.max_depth {
            break ChainEnd::DepthCap;
        }

        let Some(next) = roster.manager_of(current) else {
            if roster.has_unresolved_manager(current) {
                break ChainEnd::Unresolved;
            }
            break ChainEnd::Root;
        };

        if !visited.insert(&next.id) {
            debug!(start = %start, at = %current.id, "Manager cycle detected");
            break ChainEnd::Cycle;
        }

        ids.push(next.id.clone());
        current = next;
    };

    let mut fallback_applied = false;
    if end == ChainEnd::Unresolved {
        if let Some(root) = &options.fallback_root {
            if roster.contains(root) && !visited.contains(root) {
                ids.push(root.clone());
                fallback_applied = true;
            }
        }
    }

    ManagerChain {
        ids,
        end,
        fallback_applied,
    }
}
