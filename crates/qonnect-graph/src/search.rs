//! Ranked roster search

use crate::roster::Roster;
use qonnect_domain::{EmployeeId, EmployeeRecord, Population};
use serde::{Deserialize, Serialize};

/// Queries shorter than this return nothing
pub const MIN_QUERY_LEN: usize = 2;

/// Search options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of hits returned
    pub limit: usize,

    /// Only return employees of this population
    pub population: Option<Population>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 25,
            population: None,
        }
    }
}

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Employee id
    pub id: EmployeeId,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Department
    pub department: String,

    /// Job title
    pub designation: String,

    /// Location
    pub location: String,

    /// Population
    pub population: Population,

    /// Direct reports count
    pub reportee_count: usize,

    /// Relevance score, higher is better
    pub score: u32,
}

pub(crate) fn search(roster: &Roster, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = roster
        .iter()
        .filter(|e| options.population.map_or(true, |p| e.population == p))
        .filter_map(|e| {
            let score = score(e, &query);
            (score > 0).then(|| hit(e, score))
        })
        .collect();

    // Stable sort keeps roster order among equal scores
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(options.limit);
    hits
}

fn field_score(field: &str, query: &str, base: u32, prefix_bonus: u32) -> u32 {
    let field = field.to_lowercase();
    if !field.contains(query) {
        return 0;
    }
    if field.starts_with(query) {
        base + prefix_bonus
    } else {
        base
    }
}

fn score(emp: &EmployeeRecord, query: &str) -> u32 {
    let primary = field_score(&emp.name, query, 10, 5)
        + field_score(&emp.email, query, 8, 3)
        + field_score(emp.id.as_str(), query, 7, 3);
    if primary > 0 {
        return primary;
    }

    if emp.department.to_lowercase().contains(query) {
        4
    } else if emp.designation.to_lowercase().contains(query) {
        3
    } else {
        0
    }
}

fn hit(emp: &EmployeeRecord, score: u32) -> SearchHit {
    SearchHit {
        id: emp.id.clone(),
        name: emp.name.clone(),
        email: emp.email.clone(),
        department: emp.department.clone(),
        designation: emp.designation.clone(),
        location: emp.location.clone(),
        population: emp.population,
        reportee_count: emp.reportees.len(),
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::build(vec![
            EmployeeRecord::new("jdoe", "Jane Doe", "jane@x.example")
                .with_department("Engineering")
                .with_population(Population::Primary),
            EmployeeRecord::new("mjane", "Mary Jane", "mary@x.example")
                .with_population(Population::Partner),
            EmployeeRecord::new("bob", "Bob", "bob@x.example")
                .with_department("Platform Engineering")
                .with_designation("Janitor"),
        ])
    }

    #[test]
    fn test_name_prefix_ranks_first() {
        let hits = roster().search("jane", &SearchOptions::default());
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["jdoe", "mjane"]);
        // name prefix (15) + email prefix (11)
        assert_eq!(hits[0].score, 26);
    }

    #[test]
    fn test_department_beats_designation() {
        let hits = roster().search("engineering", &SearchOptions::default());
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.score == 4));
    }

    #[test]
    fn test_short_query_and_filter() {
        let roster = roster();
        assert!(roster.search("j", &SearchOptions::default()).is_empty());

        let partners = roster.search(
            "jane",
            &SearchOptions {
                limit: 10,
                population: Some(Population::Partner),
            },
        );
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].id.as_str(), "mjane");
    }
}
