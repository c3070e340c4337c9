//! Roster statistics

use crate::ledger::ConnectionLedger;
use crate::roster::Roster;
use qonnect_domain::{ConnectionStrength, Population};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const TOP_N: usize = 10;

/// Window for [`ConnectionStats::recent`], in seconds
pub const RECENT_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// Aggregate counts over a roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterStats {
    /// All employees
    pub total: usize,

    /// Primary population size
    pub primary: usize,

    /// Partner population size
    pub partner: usize,

    /// Everyone else
    pub other: usize,

    /// Distinct non-empty departments
    pub departments: usize,

    /// Distinct non-empty locations
    pub locations: usize,

    /// Employees with at least one reportee
    pub managers: usize,

    /// Total manager → reportee links
    pub reportee_links: usize,

    /// Largest departments by headcount
    pub top_departments: Vec<(String, usize)>,

    /// Largest locations by headcount
    pub top_locations: Vec<(String, usize)>,
}

impl RosterStats {
    /// Collect statistics from a roster
    pub fn collect(roster: &Roster) -> Self {
        let mut stats = RosterStats::default();
        let mut departments: HashMap<&str, usize> = HashMap::new();
        let mut locations: HashMap<&str, usize> = HashMap::new();

        for emp in roster.iter() {
            stats.total += 1;
            match emp.population {
                Population::Primary => stats.primary += 1,
                Population::Partner => stats.partner += 1,
                Population::Other => stats.other += 1,
            }
            if !emp.reportees.is_empty() {
                stats.managers += 1;
                stats.reportee_links += emp.reportees.len();
            }
            if !emp.department.is_empty() {
                *departments.entry(emp.department.as_str()).or_default() += 1;
            }
            if !emp.location.is_empty() {
                *locations.entry(emp.location.as_str()).or_default() += 1;
            }
        }

        stats.departments = departments.len();
        stats.locations = locations.len();
        stats.top_departments = top(departments);
        stats.top_locations = top(locations);
        stats
    }
}

/// Aggregate counts over the declared connections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStats {
    /// Declarations in the ledger
    pub total: usize,

    /// Distinct declaring Primary employees
    pub declarers: usize,

    /// Distinct Partner employees declared
    pub partners: usize,

    /// Declarations marked strong
    pub strong: usize,

    /// Declarations marked medium
    pub medium: usize,

    /// Declarations marked weak
    pub weak: usize,

    /// Declarations made within [`RECENT_WINDOW_SECS`] of `now`
    pub recent: usize,
}

impl ConnectionStats {
    /// Collect statistics from a ledger; `now` is in seconds since the epoch
    pub fn collect(ledger: &ConnectionLedger, now: u64) -> Self {
        let mut stats = ConnectionStats::default();
        let mut declarers = HashSet::new();
        let mut partners = HashSet::new();

        for c in ledger.iter() {
            stats.total += 1;
            declarers.insert(&c.from_id);
            partners.insert(&c.to_id);
            match c.strength {
                ConnectionStrength::Strong => stats.strong += 1,
                ConnectionStrength::Medium => stats.medium += 1,
                ConnectionStrength::Weak => stats.weak += 1,
            }
            if c.timestamp > 0 && now.saturating_sub(c.timestamp) < RECENT_WINDOW_SECS {
                stats.recent += 1;
            }
        }

        stats.declarers = declarers.len();
        stats.partners = partners.len();
        stats
    }
}

fn top(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(TOP_N);
    counts
}
