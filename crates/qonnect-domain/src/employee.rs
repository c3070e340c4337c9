//! Employee module - roster records and the lightweight references between them

use crate::Population;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, case-insensitive identifier for an employee
///
/// The raw value is trimmed and lower-cased on construction, so two ids that
/// differ only in case compare (and hash) equal.
///
/// # Examples
///
/// ```
/// use qonnect_domain::EmployeeId;
///
/// let a = EmployeeId::new(" Alice ");
/// let b = EmployeeId::new("ALICE");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Create a normalised id
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    /// Get the normalised id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty after normalisation
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for EmployeeId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for EmployeeId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<EmployeeId> for String {
    fn from(id: EmployeeId) -> Self {
        id.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalise an email-like string for lookups (trimmed, lower-cased)
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Lightweight reference to another employee
///
/// Used for `manager_info` and `reportees`, so a record never embeds the full
/// record of its neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRef {
    /// Referenced employee id
    pub id: EmployeeId,

    /// Display name
    pub name: String,

    /// Department at the time of the hierarchy build
    pub department: String,

    /// Job title
    #[serde(default)]
    pub designation: String,
}

/// One person in the roster
///
/// Records are created in bulk on every roster load. `manager_info` and
/// `reportees` are owned by the hierarchy build and are recomputed from
/// scratch after each load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Unique identifier (exported rosters call this the LDAP)
    #[serde(alias = "ldap")]
    pub id: EmployeeId,

    /// Display name
    pub name: String,

    /// Email address; the hierarchy is resolved through it
    #[serde(default)]
    pub email: String,

    /// Department
    #[serde(default)]
    pub department: String,

    /// Location (country or office)
    #[serde(default)]
    pub location: String,

    /// Job title
    #[serde(default)]
    pub designation: String,

    /// Raw organisation label from the roster
    #[serde(default)]
    pub organisation: String,

    /// Population derived from `organisation`
    #[serde(default)]
    pub population: Population,

    /// Raw manager email, possibly empty or unresolvable
    #[serde(default, alias = "manager")]
    pub manager_ref: String,

    /// Resolved manager, set by the hierarchy build
    #[serde(default)]
    pub manager_info: Option<EmployeeRef>,

    /// Direct reports, set by the hierarchy build
    #[serde(default)]
    pub reportees: Vec<EmployeeRef>,
}

impl EmployeeRecord {
    /// Create a record with identity fields only
    ///
    /// # Examples
    ///
    /// ```
    /// use qonnect_domain::{EmployeeRecord, Population};
    ///
    /// let emp = EmployeeRecord::new("alice", "Alice", "alice@corp.example")
    ///     .with_manager("bob@corp.example")
    ///     .with_population(Population::Primary);
    /// assert_eq!(emp.manager_ref, "bob@corp.example");
    /// assert!(emp.manager_info.is_none());
    /// ```
    pub fn new(id: impl AsRef<str>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: EmployeeId::new(id),
            name: name.into(),
            email: email.into(),
            department: String::new(),
            location: String::new(),
            designation: String::new(),
            organisation: String::new(),
            population: Population::Other,
            manager_ref: String::new(),
            manager_info: None,
            reportees: Vec::new(),
        }
    }

    /// Set the raw manager reference
    pub fn with_manager(mut self, manager_ref: impl Into<String>) -> Self {
        self.manager_ref = manager_ref.into();
        self
    }

    /// Set the department
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the job title
    pub fn with_designation(mut self, designation: impl Into<String>) -> Self {
        self.designation = designation.into();
        self
    }

    /// Set the population (and the organisation label if it is empty)
    pub fn with_population(mut self, population: Population) -> Self {
        if self.organisation.is_empty() {
            self.organisation = population.as_str().to_string();
        }
        self.population = population;
        self
    }

    /// Lightweight reference to this record
    pub fn to_ref(&self) -> EmployeeRef {
        EmployeeRef {
            id: self.id.clone(),
            name: self.name.clone(),
            department: self.department.clone(),
            designation: self.designation.clone(),
        }
    }

    /// Normalised email used as the hierarchy lookup key
    pub fn email_key(&self) -> String {
        normalize_email(&self.email)
    }

    /// Local part of the email (before `@`), lower-cased
    pub fn email_prefix(&self) -> Option<String> {
        let email = self.email_key();
        let prefix = email.split('@').next().unwrap_or_default();
        if prefix.is_empty() {
            None
        } else {
            Some(prefix.to_string())
        }
    }

    /// True when the raw manager reference is non-empty
    pub fn has_manager_ref(&self) -> bool {
        !self.manager_ref.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_case_insensitive() {
        assert_eq!(EmployeeId::new("Bob"), EmployeeId::new(" bob"));
        assert_ne!(EmployeeId::new("bob"), EmployeeId::new("rob"));
    }

    #[test]
    fn test_id_deserializes_normalised() {
        let id: EmployeeId = serde_json::from_str("\"  MixedCase \"").unwrap();
        assert_eq!(id.as_str(), "mixedcase");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"mixedcase\"");
    }

    #[test]
    fn test_record_accepts_ldap_field_names() {
        let json = r#"{
            "ldap": "AshwinK",
            "name": "Ashwin Kumar",
            "email": "ashwink@corp.example",
            "manager": "sarah.wilson@corp.example"
        }"#;
        let emp: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(emp.id.as_str(), "ashwink");
        assert_eq!(emp.manager_ref, "sarah.wilson@corp.example");
        assert_eq!(emp.population, Population::Other);
        assert!(emp.reportees.is_empty());
    }

    #[test]
    fn test_email_prefix() {
        let emp = EmployeeRecord::new("a", "A", " Alice.Smith@Corp.example ");
        assert_eq!(emp.email_prefix().as_deref(), Some("alice.smith"));

        let no_email = EmployeeRecord::new("b", "B", "");
        assert!(no_email.email_prefix().is_none());
    }
}
