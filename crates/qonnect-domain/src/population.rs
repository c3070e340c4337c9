//! Population module - the closed set of groups an employee can belong to

use serde::{Deserialize, Serialize};

/// Population an employee belongs to
///
/// Connection lookups always run from the Primary population towards the
/// Partner population:
/// - Primary: the internal organisation initiating lookups
/// - Partner: the external, smaller group being connected to
/// - Other: anyone else in the roster (still part of the hierarchy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Population {
    /// Internal organisation
    Primary,

    /// External partner organisation
    Partner,

    /// Neither of the above
    #[default]
    Other,
}

impl Population {
    /// Get the population name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Population::Primary => "primary",
            Population::Partner => "partner",
            Population::Other => "other",
        }
    }

    /// Parse a population from a string (internal use)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Some(Population::Primary),
            "partner" => Some(Population::Partner),
            "other" => Some(Population::Other),
            _ => None,
        }
    }

    /// Classify a raw organisation label against the configured labels
    ///
    /// Comparison ignores case and surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use qonnect_domain::Population;
    ///
    /// assert_eq!(Population::classify("google", "Google", "Olenick"), Population::Primary);
    /// assert_eq!(Population::classify("OLENICK ", "Google", "Olenick"), Population::Partner);
    /// assert_eq!(Population::classify("Acme", "Google", "Olenick"), Population::Other);
    /// ```
    pub fn classify(organisation: &str, primary_label: &str, partner_label: &str) -> Self {
        let label = organisation.trim();
        if label.eq_ignore_ascii_case(primary_label.trim()) {
            Population::Primary
        } else if label.eq_ignore_ascii_case(partner_label.trim()) {
            Population::Partner
        } else {
            Population::Other
        }
    }
}

impl std::str::FromStr for Population {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid population: {}", s))
    }
}
