//! Roster source implementations
//!
//! [`JsonRosterSource`] reads the roster and the declaration log from JSON
//! files. [`StaticRoster`] holds everything in memory and is what tests and
//! embedders use.

use crate::config::RosterConfig;
use qonnect_domain::{DeclaredConnection, EmployeeRecord, Population, RosterSource};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from the JSON roster source
#[derive(Debug, Error)]
pub enum JsonSourceError {
    /// File could not be read or written
    #[error("IO error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File content is not the expected JSON
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EmployeeFile {
    Bare(Vec<EmployeeRecord>),
    Wrapped { employees: Vec<EmployeeRecord> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConnectionFile {
    Bare(Vec<DeclaredConnection>),
    Wrapped { connections: Vec<DeclaredConnection> },
}

#[derive(Serialize)]
struct ConnectionFileOut<'a> {
    connections: &'a [DeclaredConnection],
}

/// Roster and declarations stored as JSON files
///
/// The employees file is either a bare array or `{ "employees": [...] }`.
/// The connections file follows the same shape with a `connections` key and
/// may be absent, which reads as an empty log.
pub struct JsonRosterSource {
    employees_path: PathBuf,
    connections_path: PathBuf,
    primary_label: String,
    partner_label: String,
    write_lock: Mutex<()>,
}

impl JsonRosterSource {
    /// Create a source from the roster section of the configuration
    pub fn new(config: &RosterConfig) -> Self {
        Self {
            employees_path: config.employees_path.clone(),
            connections_path: config.connections_path.clone(),
            primary_label: config.primary_organisation.clone(),
            partner_label: config.partner_organisation.clone(),
            write_lock: Mutex::new(()),
        }
    }

    fn read(path: &Path) -> Result<String, JsonSourceError> {
        std::fs::read_to_string(path).map_err(|source| JsonSourceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> Result<T, JsonSourceError> {
        serde_json::from_str(text).map_err(|source| JsonSourceError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set `population` from the organisation label when one is present
    fn classify(&self, record: &mut EmployeeRecord) {
        if !record.organisation.trim().is_empty() {
            record.population =
                Population::classify(&record.organisation, &self.primary_label, &self.partner_label);
        }
    }

    fn write_connections(&self, connections: &[DeclaredConnection]) -> Result<(), JsonSourceError> {
        let path = &self.connections_path;
        let io_err = |source| JsonSourceError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let body = serde_json::to_string_pretty(&ConnectionFileOut { connections }).map_err(
            |source| JsonSourceError::Json {
                path: path.clone(),
                source,
            },
        )?;

        // Write beside the target and rename so readers never see half a file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}

impl RosterSource for JsonRosterSource {
    type Error = JsonSourceError;

    fn load_employees(&self) -> Result<Vec<EmployeeRecord>, Self::Error> {
        let text = Self::read(&self.employees_path)?;
        let mut employees = match Self::parse(&self.employees_path, &text)? {
            EmployeeFile::Bare(list) => list,
            EmployeeFile::Wrapped { employees } => employees,
        };
        for record in &mut employees {
            self.classify(record);
        }

        info!(
            path = %self.employees_path.display(),
            count = employees.len(),
            "Employees loaded"
        );
        Ok(employees)
    }

    fn load_connections(&self) -> Result<Vec<DeclaredConnection>, Self::Error> {
        if !self.connections_path.exists() {
            debug!(path = %self.connections_path.display(), "No connections file; starting empty");
            return Ok(Vec::new());
        }

        let text = Self::read(&self.connections_path)?;
        let connections = match Self::parse(&self.connections_path, &text)? {
            ConnectionFile::Bare(list) => list,
            ConnectionFile::Wrapped { connections } => connections,
        };
        Ok(connections)
    }

    fn record_connection(&self, connection: &DeclaredConnection) -> Result<(), Self::Error> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut connections = self.load_connections()?;
        connections.push(connection.clone());
        self.write_connections(&connections)?;

        debug!(
            from = %connection.from_id,
            to = %connection.to_id,
            total = connections.len(),
            "Connection appended"
        );
        Ok(())
    }
}

/// In-memory roster source
///
/// Clones share nothing; wrap in `Arc` to share one instance.
#[derive(Debug, Default)]
pub struct StaticRoster {
    employees: Mutex<Vec<EmployeeRecord>>,
    connections: Mutex<Vec<DeclaredConnection>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StaticRoster {
    /// Create a source holding `employees` and `connections`
    pub fn new(employees: Vec<EmployeeRecord>, connections: Vec<DeclaredConnection>) -> Self {
        Self {
            employees: Mutex::new(employees),
            connections: Mutex::new(connections),
        }
    }

    /// Replace the employee list; visible on the next reload
    pub fn set_employees(&self, employees: Vec<EmployeeRecord>) {
        *lock(&self.employees) = employees;
    }

    /// Declarations recorded so far
    pub fn connections(&self) -> Vec<DeclaredConnection> {
        lock(&self.connections).clone()
    }
}

impl RosterSource for StaticRoster {
    type Error = Infallible;

    fn load_employees(&self) -> Result<Vec<EmployeeRecord>, Self::Error> {
        Ok(lock(&self.employees).clone())
    }

    fn load_connections(&self) -> Result<Vec<DeclaredConnection>, Self::Error> {
        Ok(lock(&self.connections).clone())
    }

    fn record_connection(&self, connection: &DeclaredConnection) -> Result<(), Self::Error> {
        lock(&self.connections).push(connection.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qonnect_domain::{ConnectionStrength, EmployeeId};
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> RosterConfig {
        RosterConfig {
            employees_path: dir.path().join("employees.json"),
            connections_path: dir.path().join("data").join("connections.json"),
            primary_organisation: "Google".to_string(),
            partner_organisation: "Olenick".to_string(),
            ..RosterConfig::default()
        }
    }

    #[test]
    fn test_wrapped_employees_are_classified() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir);
        std::fs::write(
            &cfg.employees_path,
            r#"{"employees": [
                {"ldap": "Alice", "name": "Alice", "email": "alice@corp.example", "organisation": "google"},
                {"id": "zed", "name": "Zed", "organisation": "Olenick", "manager": "yan@partner.example"}
            ]}"#,
        )
        .unwrap();

        let source = JsonRosterSource::new(&cfg);
        let employees = source.load_employees().unwrap();

        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].id, EmployeeId::new("alice"));
        assert_eq!(employees[0].population, Population::Primary);
        assert_eq!(employees[1].population, Population::Partner);
        assert_eq!(employees[1].manager_ref, "yan@partner.example");
    }

    #[test]
    fn test_bare_array_keeps_explicit_population() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir);
        std::fs::write(
            &cfg.employees_path,
            r#"[{"id": "bob", "name": "Bob", "population": "partner"}]"#,
        )
        .unwrap();

        let employees = JsonRosterSource::new(&cfg).load_employees().unwrap();
        assert_eq!(employees[0].population, Population::Partner);
    }

    #[test]
    fn test_missing_employees_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let source = JsonRosterSource::new(&config(&dir));
        assert!(matches!(
            source.load_employees(),
            Err(JsonSourceError::Io { .. })
        ));
    }

    #[test]
    fn test_connections_append_and_reload() {
        let dir = TempDir::new().unwrap();
        let source = JsonRosterSource::new(&config(&dir));
        assert!(source.load_connections().unwrap().is_empty());

        source
            .record_connection(&DeclaredConnection::new("alice", "zed", ConnectionStrength::Strong))
            .unwrap();
        source
            .record_connection(&DeclaredConnection::new("alice", "yan", ConnectionStrength::Weak))
            .unwrap();

        let loaded = source.load_connections().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].to_id, EmployeeId::new("yan"));
    }

    #[test]
    fn test_static_roster_records() {
        let source = StaticRoster::default();
        source
            .record_connection(&DeclaredConnection::new("a", "b", ConnectionStrength::Medium))
            .unwrap();
        assert_eq!(source.load_connections().unwrap().len(), 1);
        assert_eq!(source.connections().len(), 1);
    }
}
