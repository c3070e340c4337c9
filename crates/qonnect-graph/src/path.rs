//! Organisational path resolution
//!
//! Measures how many hops separate two employees in the reporting structure
//! and returns the literal path between them. Rules are tried in a fixed
//! order and the first one that applies decides the answer:
//!
//! | Rule            | Condition                                  | Count      |
//! |-----------------|--------------------------------------------|------------|
//! | identical       | `from == to`                               | 0          |
//! | unknown         | either id not in roster                    | 1          |
//! | direct manager  | `to` is `from`'s manager                   | 1          |
//! | direct report   | `from` is `to`'s manager                   | 1          |
//! | siblings        | same direct manager                        | 2          |
//! | ancestor        | `to` at position p in `from`'s chain       | p + 1      |
//! | descendant      | `from` at position p in `to`'s chain       | p + 1      |
//! | common manager  | first shared entry at (i, j)               | i + j + 2  |
//! | disconnected    | nothing shared                             | lf + lt + 1|
//!
//! `intermediate_count` always equals `path.len() - 1`. For the two estimates
//! (unknown, disconnected) the path is the best route the roster can offer.

use crate::chain::{manager_chain, ChainOptions, ManagerChain};
use crate::roster::Roster;
use qonnect_domain::EmployeeId;
use serde::{Deserialize, Serialize};

/// Count returned when either endpoint is not in the roster
pub const UNKNOWN_EMPLOYEE_DISTANCE: u32 = 1;

/// Which rule produced a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMethod {
    /// Both ids are the same
    Identical,

    /// `to` manages `from`
    DirectManager,

    /// `from` manages `to`
    DirectReport,

    /// Same direct manager
    Siblings,

    /// `to` is higher up `from`'s chain
    Ancestor,

    /// `from` is higher up `to`'s chain
    Descendant,

    /// Joined through a shared manager
    CommonManager,

    /// Chains share nothing; the count is an upper-bound estimate
    Disconnected,

    /// An endpoint is not in the roster; the count is a fixed default
    UnknownEmployee,
}

impl PathMethod {
    /// Get the method name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PathMethod::Identical => "identical",
            PathMethod::DirectManager => "direct_manager",
            PathMethod::DirectReport => "direct_report",
            PathMethod::Siblings => "siblings",
            PathMethod::Ancestor => "ancestor",
            PathMethod::Descendant => "descendant",
            PathMethod::CommonManager => "common_manager",
            PathMethod::Disconnected => "disconnected",
            PathMethod::UnknownEmployee => "unknown_employee",
        }
    }

    /// True when the count is an estimate rather than a real path
    pub fn is_estimate(&self) -> bool {
        matches!(self, PathMethod::Disconnected | PathMethod::UnknownEmployee)
    }
}

/// Distance and route between two employees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgPath {
    /// Start of the path
    pub from: EmployeeId,

    /// End of the path
    pub to: EmployeeId,

    /// Every employee on the route, `from` first and `to` last
    pub path: Vec<EmployeeId>,

    /// Hops between the two endpoints
    pub intermediate_count: u32,

    /// Rule that produced this answer
    pub method: PathMethod,
}

impl OrgPath {
    fn new(from: &EmployeeId, to: &EmployeeId, path: Vec<EmployeeId>, method: PathMethod) -> Self {
        let intermediate_count = path.len().saturating_sub(1) as u32;
        Self {
            from: from.clone(),
            to: to.clone(),
            path,
            intermediate_count,
            method,
        }
    }
}

/// Resolve the organisational path between two employees
///
/// Never fails: unknown endpoints produce [`PathMethod::UnknownEmployee`] with
/// [`UNKNOWN_EMPLOYEE_DISTANCE`].
pub fn resolve_path(
    roster: &Roster,
    from: &EmployeeId,
    to: &EmployeeId,
    options: &ChainOptions,
) -> OrgPath {
    if from == to {
        return OrgPath::new(from, to, vec![from.clone()], PathMethod::Identical);
    }
    if !roster.contains(from) || !roster.contains(to) {
        return OrgPath {
            from: from.clone(),
            to: to.clone(),
            path: vec![from.clone(), to.clone()],
            intermediate_count: UNKNOWN_EMPLOYEE_DISTANCE,
            method: PathMethod::UnknownEmployee,
        };
    }

    let from_chain = manager_chain(roster, from, options);
    let to_chain = manager_chain(roster, to, options);
    resolve_between(from, to, &from_chain, &to_chain)
}

/// Apply the path rules to two already computed chains
pub(crate) fn resolve_between(
    from: &EmployeeId,
    to: &EmployeeId,
    from_chain: &ManagerChain,
    to_chain: &ManagerChain,
) -> OrgPath {
    if from == to {
        return OrgPath::new(from, to, vec![from.clone()], PathMethod::Identical);
    }

    if from_chain.direct_manager() == Some(to) {
        return OrgPath::new(from, to, vec![from.clone(), to.clone()], PathMethod::DirectManager);
    }

    if to_chain.direct_manager() == Some(from) {
        return OrgPath::new(from, to, vec![from.clone(), to.clone()], PathMethod::DirectReport);
    }

    if let (Some(a), Some(b)) = (from_chain.direct_manager(), to_chain.direct_manager()) {
        if a == b {
            return OrgPath::new(
                from,
                to,
                vec![from.clone(), a.clone(), to.clone()],
                PathMethod::Siblings,
            );
        }
    }

    if let Some(p) = from_chain.position(to) {
        let mut path = Vec::with_capacity(p + 2);
        path.push(from.clone());
        path.extend(from_chain.ids[..=p].iter().cloned());
        return OrgPath::new(from, to, path, PathMethod::Ancestor);
    }

    if let Some(p) = to_chain.position(from) {
        let mut path = Vec::with_capacity(p + 2);
        path.push(from.clone());
        path.extend(to_chain.ids[..p].iter().rev().cloned());
        path.push(to.clone());
        return OrgPath::new(from, to, path, PathMethod::Descendant);
    }

    for (i, manager) in from_chain.ids.iter().enumerate() {
        if let Some(j) = to_chain.position(manager) {
            let mut path = Vec::with_capacity(i + j + 3);
            path.push(from.clone());
            path.extend(from_chain.ids[..=i].iter().cloned());
            path.extend(to_chain.ids[..j].iter().rev().cloned());
            path.push(to.clone());
            return OrgPath::new(from, to, path, PathMethod::CommonManager);
        }
    }

    let mut path = Vec::with_capacity(from_chain.len() + to_chain.len() + 2);
    path.push(from.clone());
    path.extend(from_chain.ids.iter().cloned());
    path.extend(to_chain.ids.iter().rev().cloned());
    path.push(to.clone());
    OrgPath::new(from, to, path, PathMethod::Disconnected)
}
