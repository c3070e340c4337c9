//! Hierarchy build and per-employee hierarchy views
//!
//! The build links every employee to its manager by resolving the raw
//! `manager_ref` email against an email index, then fills in each manager's
//! `reportees`. It never fails: unresolvable references, self-reports and
//! empty references are counted in the [`HierarchyReport`] and logged.

use crate::chain::{manager_chain, ChainOptions};
use crate::roster::Roster;
use qonnect_domain::{normalize_email, EmployeeId, EmployeeRecord, EmployeeRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Outcome counts of one hierarchy build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyReport {
    /// Manager links established
    pub links: usize,

    /// Employees with at least one reportee
    pub managers: usize,

    /// Employees with an empty manager reference
    pub without_manager: usize,

    /// Manager references that matched no email
    pub unresolved: usize,

    /// Manager references pointing at the employee itself
    pub self_reports: usize,
}

/// Link every record to its manager and fill in reportee lists
///
/// Previous `manager_info` and `reportees` are discarded first, so calling
/// this twice on the same records yields the same result. When two records
/// share an email the first one wins.
pub fn build_hierarchy(employees: &mut [EmployeeRecord]) -> HierarchyReport {
    for emp in employees.iter_mut() {
        emp.manager_info = None;
        emp.reportees.clear();
    }

    let mut by_email: HashMap<String, usize> = HashMap::with_capacity(employees.len());
    for (idx, emp) in employees.iter().enumerate() {
        let key = emp.email_key();
        if !key.is_empty() {
            by_email.entry(key).or_insert(idx);
        }
    }

    let mut report = HierarchyReport::default();
    let mut links: Vec<(usize, usize)> = Vec::new();

    for (idx, emp) in employees.iter().enumerate() {
        if !emp.has_manager_ref() {
            report.without_manager += 1;
            continue;
        }

        match by_email.get(&normalize_email(&emp.manager_ref)) {
            None => {
                report.unresolved += 1;
                debug!(employee = %emp.id, manager_ref = %emp.manager_ref, "Manager reference not found");
            }
            Some(&manager_idx) if manager_idx == idx || employees[manager_idx].id == emp.id => {
                report.self_reports += 1;
                debug!(employee = %emp.id, "Skipping self-report");
            }
            Some(&manager_idx) => links.push((idx, manager_idx)),
        }
    }

    for (idx, manager_idx) in links {
        let manager = employees[manager_idx].to_ref();
        let reportee = employees[idx].to_ref();
        employees[idx].manager_info = Some(manager);

        let reportees = &mut employees[manager_idx].reportees;
        if !reportees.iter().any(|r| r.id == reportee.id) {
            reportees.push(reportee);
            report.links += 1;
        }
    }

    report.managers = employees.iter().filter(|e| !e.reportees.is_empty()).count();

    info!(
        employees = employees.len(),
        links = report.links,
        managers = report.managers,
        unresolved = report.unresolved,
        self_reports = report.self_reports,
        "Hierarchy built"
    );

    report
}

/// One employee's position in the organisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyView {
    /// The employee record itself
    pub employee: EmployeeRecord,

    /// Managers from the direct manager upward (no fallback root)
    pub manager_chain: Vec<EmployeeRef>,

    /// Direct reports
    pub reportees: Vec<EmployeeRef>,

    /// Other reportees of the same direct manager
    pub peer_count: usize,

    /// Number of levels above the employee
    pub hierarchy_depth: usize,

    /// Direct reports count
    pub total_reports: usize,
}

impl HierarchyView {
    /// Build the view for `id`, or `None` when the id is unknown
    pub fn build(roster: &Roster, id: &EmployeeId, max_depth: usize) -> Option<Self> {
        let employee = roster.get(id)?;
        let chain = manager_chain(roster, id, &ChainOptions::without_fallback(max_depth));

        let manager_chain: Vec<EmployeeRef> = chain
            .ids
            .iter()
            .filter_map(|m| roster.get(m))
            .map(EmployeeRecord::to_ref)
            .collect();

        let peer_count = employee
            .manager_info
            .as_ref()
            .and_then(|m| roster.get(&m.id))
            .map(|m| m.reportees.iter().filter(|r| r.id != employee.id).count())
            .unwrap_or(0);

        Some(Self {
            employee: employee.clone(),
            hierarchy_depth: manager_chain.len(),
            manager_chain,
            reportees: employee.reportees.clone(),
            peer_count,
            total_reports: employee.reportees.len(),
        })
    }
}
