//! Indexed roster
//!
//! Owns the employee records after the hierarchy build and indexes them by id,
//! email, email prefix and name token.

use crate::hierarchy::{build_hierarchy, HierarchyReport};
use crate::search::{self, SearchHit, SearchOptions};
use crate::stats::RosterStats;
use qonnect_domain::{normalize_email, EmployeeId, EmployeeRecord, Population};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Immutable, indexed set of employee records
#[derive(Debug, Clone, Default)]
pub struct Roster {
    employees: Vec<EmployeeRecord>,
    by_id: HashMap<EmployeeId, usize>,
    by_email: HashMap<String, usize>,
    by_email_prefix: HashMap<String, Vec<usize>>,
    by_name_token: HashMap<String, Vec<usize>>,
    hierarchy: HierarchyReport,
}

impl Roster {
    /// Build a roster from raw records
    ///
    /// Records with an empty id are dropped, and for duplicate ids the first
    /// record wins. Hierarchy fields on the input are ignored and rebuilt.
    pub fn build(records: Vec<EmployeeRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        let mut employees = Vec::with_capacity(records.len());

        for record in records {
            if record.id.is_empty() {
                warn!(name = %record.name, "Dropping employee record without id");
                continue;
            }
            if !seen.insert(record.id.clone()) {
                warn!(employee = %record.id, "Dropping duplicate employee record");
                continue;
            }
            employees.push(record);
        }

        let hierarchy = build_hierarchy(&mut employees);

        let mut roster = Self {
            employees,
            hierarchy,
            ..Self::default()
        };
        roster.index();
        roster
    }

    /// Roster with no employees
    pub fn empty() -> Self {
        Self::default()
    }

    fn index(&mut self) {
        for (idx, emp) in self.employees.iter().enumerate() {
            self.by_id.insert(emp.id.clone(), idx);

            let email = emp.email_key();
            if !email.is_empty() {
                self.by_email.entry(email).or_insert(idx);
            }
            if let Some(prefix) = emp.email_prefix() {
                self.by_email_prefix.entry(prefix).or_default().push(idx);
            }

            let mut tokens: Vec<String> = emp
                .name
                .split_whitespace()
                .map(|t| t.to_lowercase())
                .collect();
            tokens.sort();
            tokens.dedup();
            for token in tokens {
                self.by_name_token.entry(token).or_default().push(idx);
            }
        }
    }

    /// Number of employees
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// True when the roster has no employees
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Look up an employee by id
    pub fn get(&self, id: &EmployeeId) -> Option<&EmployeeRecord> {
        self.by_id.get(id).map(|&idx| &self.employees[idx])
    }

    /// True when the id is in the roster
    pub fn contains(&self, id: &EmployeeId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Look up an employee by email (case-insensitive)
    pub fn by_email(&self, email: &str) -> Option<&EmployeeRecord> {
        self.by_email
            .get(&normalize_email(email))
            .map(|&idx| &self.employees[idx])
    }

    /// Employees whose email local part equals `prefix`
    pub fn by_email_prefix(&self, prefix: &str) -> Vec<&EmployeeRecord> {
        self.lookup(&self.by_email_prefix, &normalize_email(prefix))
    }

    /// Employees whose name contains the whole word `token`
    pub fn by_name_token(&self, token: &str) -> Vec<&EmployeeRecord> {
        self.lookup(&self.by_name_token, &token.trim().to_lowercase())
    }

    fn lookup(&self, index: &HashMap<String, Vec<usize>>, key: &str) -> Vec<&EmployeeRecord> {
        index
            .get(key)
            .map(|idxs| idxs.iter().map(|&i| &self.employees[i]).collect())
            .unwrap_or_default()
    }

    /// Resolve a free-form handle to a single employee
    ///
    /// Tries, in order: id, email, email prefix, name token. The last two only
    /// match when exactly one employee qualifies.
    pub fn find(&self, handle: &str) -> Option<&EmployeeRecord> {
        if let Some(emp) = self.get(&EmployeeId::new(handle)) {
            return Some(emp);
        }
        if let Some(emp) = self.by_email(handle) {
            return Some(emp);
        }
        if let [only] = self.by_email_prefix(handle).as_slice() {
            return Some(*only);
        }
        if let [only] = self.by_name_token(handle).as_slice() {
            return Some(*only);
        }
        None
    }

    /// The resolved manager of an employee, if any
    pub fn manager_of(&self, emp: &EmployeeRecord) -> Option<&EmployeeRecord> {
        emp.manager_info.as_ref().and_then(|m| self.get(&m.id))
    }

    /// True when the employee names a manager whose email matches nobody
    pub fn has_unresolved_manager(&self, emp: &EmployeeRecord) -> bool {
        emp.has_manager_ref() && self.by_email(&emp.manager_ref).is_none()
    }

    /// All employees in load order
    pub fn iter(&self) -> impl Iterator<Item = &EmployeeRecord> {
        self.employees.iter()
    }

    /// Employees of one population in load order
    pub fn population(&self, population: Population) -> impl Iterator<Item = &EmployeeRecord> {
        self.employees
            .iter()
            .filter(move |e| e.population == population)
    }

    /// Report from the hierarchy build
    pub fn hierarchy_report(&self) -> &HierarchyReport {
        &self.hierarchy
    }

    /// Ranked substring search over name, email, id, department and title
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        search::search(self, query, options)
    }

    /// Aggregate counts over the roster
    pub fn stats(&self) -> RosterStats {
        RosterStats::collect(self)
    }
}
