//! Connection module - declared Primary → Partner edges and resolved answers

use crate::EmployeeId;
use serde::{Deserialize, Serialize};

/// Strength of a connection, ordered weak < medium < strong
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStrength {
    /// Acquaintance or indirect tie
    Weak,

    /// Regular working relationship
    Medium,

    /// Direct, trusted relationship
    Strong,
}

impl ConnectionStrength {
    /// Get the strength name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStrength::Weak => "weak",
            ConnectionStrength::Medium => "medium",
            ConnectionStrength::Strong => "strong",
        }
    }

    /// Parse a strength, ignoring case ("Strong", "MEDIUM", ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weak" => Some(ConnectionStrength::Weak),
            "medium" => Some(ConnectionStrength::Medium),
            "strong" => Some(ConnectionStrength::Strong),
            _ => None,
        }
    }

    /// Path length implied by a declared strength
    ///
    /// A declared strong tie means "no intermediary", independent of how far
    /// apart the two people sit in the organisation: strong → 0, medium → 1,
    /// weak → 2.
    pub fn path_length(&self) -> u32 {
        match self {
            ConnectionStrength::Strong => 0,
            ConnectionStrength::Medium => 1,
            ConnectionStrength::Weak => 2,
        }
    }
}

impl std::str::FromStr for ConnectionStrength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid connection strength: {}", s))
    }
}

/// An explicit edge from a Primary employee to a Partner employee
///
/// Declarations are append-only. Several declarations for the same pair may
/// coexist; the best one is chosen at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredConnection {
    /// Primary-population employee
    pub from_id: EmployeeId,

    /// Partner-population employee
    pub to_id: EmployeeId,

    /// Declared strength
    pub strength: ConnectionStrength,

    /// Who made the declaration
    #[serde(default)]
    pub declared_by: String,

    /// When the declaration was made (seconds since Unix epoch)
    #[serde(default)]
    pub timestamp: u64,

    /// Free-form notes
    #[serde(default)]
    pub notes: String,
}

impl DeclaredConnection {
    /// Create a declaration with empty metadata
    pub fn new(
        from_id: impl AsRef<str>,
        to_id: impl AsRef<str>,
        strength: ConnectionStrength,
    ) -> Self {
        Self {
            from_id: EmployeeId::new(from_id),
            to_id: EmployeeId::new(to_id),
            strength,
            declared_by: String::new(),
            timestamp: 0,
            notes: String::new(),
        }
    }
}

/// Where a resolved connection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionSource {
    /// The requester declared it directly
    Declared,

    /// Derived from the hierarchy (manager chain or department)
    Inferred,

    /// Reached through another Primary employee's declaration
    Transitive,
}

impl ConnectionSource {
    /// Get the source name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionSource::Declared => "declared",
            ConnectionSource::Inferred => "inferred",
            ConnectionSource::Transitive => "transitive",
        }
    }
}

/// Query-time answer for one (employee, partner) pair
///
/// Never persisted as roster data; only cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConnection {
    /// Partner-population employee
    pub partner_id: EmployeeId,

    /// Partner display name
    pub partner_name: String,

    /// Strength of the underlying tie
    pub strength: ConnectionStrength,

    /// 0 = direct; larger = more distant
    pub path_length: u32,

    /// Which resolution step produced this entry
    pub source: ConnectionSource,

    /// Bridging employee, for transitive entries
    pub via: Option<EmployeeId>,

    /// Literal path from the requester to the partner
    pub path: Vec<EmployeeId>,

    /// Free-form notes
    pub notes: String,
}
