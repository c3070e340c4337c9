//! Configuration file parsing for the service
//!
//! Loads roster locations, graph bounds, cache layers and warm-up settings
//! from a single TOML file. Every field has a default, so an empty file is a
//! valid configuration.
//!
//! ```toml
//! [roster]
//! employees_path = "data/employees.json"
//! connections_path = "data/connections.json"
//! primary_organisation = "Google"
//! partner_organisation = "Olenick"
//! refresh_interval_minutes = 60
//!
//! [graph]
//! max_chain_depth = 20
//! fallback_root = "ceo"
//!
//! [cache]
//! memory_ttl_secs = 3600
//! local_path = "/var/lib/qonnect/cache.db"
//! remote_url = "https://blobs.example/qonnect"
//!
//! [warm]
//! on_startup = true
//! top_primary = 50
//! ```

use qonnect_cache::CacheConfig;
use qonnect_domain::EmployeeId;
use qonnect_graph::GraphConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Service configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QonnectConfig {
    /// Where the roster comes from and how it is classified
    #[serde(default)]
    pub roster: RosterConfig,

    /// Graph walk bounds
    #[serde(default)]
    pub graph: GraphConfig,

    /// Cache layers
    #[serde(default)]
    pub cache: CacheConfig,

    /// Cache warm-up
    #[serde(default)]
    pub warm: WarmConfig,
}

/// Roster source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// JSON file with employee records
    #[serde(default = "default_employees_path")]
    pub employees_path: PathBuf,

    /// JSON file with declared connections
    #[serde(default = "default_connections_path")]
    pub connections_path: PathBuf,

    /// Organisation label of the Primary population
    #[serde(default = "default_primary_organisation")]
    pub primary_organisation: String,

    /// Organisation label of the Partner population
    #[serde(default = "default_partner_organisation")]
    pub partner_organisation: String,

    /// How often the refresh worker reloads the roster (in minutes)
    #[serde(default = "default_refresh_interval_minutes")]
    pub refresh_interval_minutes: u64,
}

fn default_employees_path() -> PathBuf {
    PathBuf::from("data/employees.json")
}

fn default_connections_path() -> PathBuf {
    PathBuf::from("data/connections.json")
}

fn default_primary_organisation() -> String {
    "primary".to_string()
}

fn default_partner_organisation() -> String {
    "partner".to_string()
}

fn default_refresh_interval_minutes() -> u64 {
    60
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            employees_path: default_employees_path(),
            connections_path: default_connections_path(),
            primary_organisation: default_primary_organisation(),
            partner_organisation: default_partner_organisation(),
            refresh_interval_minutes: default_refresh_interval_minutes(),
        }
    }
}

impl RosterConfig {
    /// Get refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes * 60)
    }
}

/// Cache warm-up settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmConfig {
    /// Warm once right after the first load
    #[serde(default)]
    pub on_startup: bool,

    /// Warm again after every periodic refresh
    #[serde(default)]
    pub after_refresh: bool,

    /// Explicit employees to warm; when empty, `top_primary` is used
    #[serde(default)]
    pub employees: Vec<EmployeeId>,

    /// Number of Primary employees (in roster order) to warm
    #[serde(default = "default_top_primary")]
    pub top_primary: usize,

    /// Stop after this many failures in a row
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: usize,

    /// Progress file for resumable `warm` runs; unset runs start over
    #[serde(default)]
    pub checkpoint_path: Option<PathBuf>,
}

fn default_top_primary() -> usize {
    50
}

fn default_max_consecutive_failures() -> usize {
    5
}

impl Default for WarmConfig {
    fn default() -> Self {
        Self {
            on_startup: false,
            after_refresh: false,
            employees: Vec::new(),
            top_primary: default_top_primary(),
            max_consecutive_failures: default_max_consecutive_failures(),
            checkpoint_path: None,
        }
    }
}

impl QonnectConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: QonnectConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.max_chain_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "graph.max_chain_depth".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.roster.refresh_interval_minutes == 0 {
            return Err(ConfigError::Invalid {
                field: "roster.refresh_interval_minutes".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.warm.max_consecutive_failures == 0 {
            return Err(ConfigError::Invalid {
                field: "warm.max_consecutive_failures".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.cache.remote_url.is_some() && self.cache.remote_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "cache.remote_timeout_secs".to_string(),
                reason: "a remote layer needs a non-zero timeout".to_string(),
            });
        }
        Ok(())
    }

    /// Apply `QONNECT_*` environment overrides for data locations
    ///
    /// - `QONNECT_EMPLOYEES`: employees JSON file
    /// - `QONNECT_CONNECTIONS`: connections JSON file
    /// - `QONNECT_CACHE_PATH`: local cache database
    /// - `QONNECT_REMOTE_URL`: remote cache endpoint
    /// - `QONNECT_REMOTE_TOKEN`: remote cache bearer token
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("QONNECT_EMPLOYEES") {
            self.roster.employees_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("QONNECT_CONNECTIONS") {
            self.roster.connections_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("QONNECT_CACHE_PATH") {
            self.cache.local_path = Some(PathBuf::from(path));
        }
        if let Some(url) = lookup("QONNECT_REMOTE_URL") {
            self.cache.remote_url = Some(url);
        }
        if let Some(token) = lookup("QONNECT_REMOTE_TOKEN") {
            self.cache.remote_token = Some(token);
        }
    }
}
