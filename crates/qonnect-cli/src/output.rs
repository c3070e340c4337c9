//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use qonnect_cache::CacheStats;
use qonnect_domain::{EmployeeId, ResolvedConnection};
use qonnect_graph::{HierarchyView, OrgPath, SearchHit};
use qonnect_service::{ServiceStats, WarmReport};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

fn ids(ids: &[EmployeeId]) -> String {
    ids.iter().map(EmployeeId::as_str).collect::<Vec<_>>().join(" → ")
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a hierarchy view.
    pub fn format_hierarchy(&self, view: &HierarchyView) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(view),
            OutputFormat::Quiet => Ok(view
                .manager_chain
                .iter()
                .map(|m| m.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let emp = &view.employee;
                let mut out = vec![
                    self.colorize(&format!("{} ({})", emp.name, emp.id), "cyan"),
                    format!("  {} · {} · {}", emp.designation, emp.department, emp.location),
                    format!(
                        "  depth {} · {} direct report(s) · {} peer(s)",
                        view.hierarchy_depth, view.total_reports, view.peer_count
                    ),
                ];

                if !view.manager_chain.is_empty() {
                    let mut builder = Builder::default();
                    builder.push_record(["Level", "Manager", "Name", "Department", "Title"]);
                    for (level, m) in view.manager_chain.iter().enumerate() {
                        builder.push_record([
                            (level + 1).to_string(),
                            m.id.to_string(),
                            m.name.clone(),
                            m.department.clone(),
                            m.designation.clone(),
                        ]);
                    }
                    out.push(self.table(builder));
                }

                if !view.reportees.is_empty() {
                    let mut builder = Builder::default();
                    builder.push_record(["Reportee", "Name", "Department", "Title"]);
                    for r in &view.reportees {
                        builder.push_record([
                            r.id.to_string(),
                            r.name.clone(),
                            r.department.clone(),
                            r.designation.clone(),
                        ]);
                    }
                    out.push(self.table(builder));
                }

                Ok(out.join("\n"))
            }
        }
    }

    /// Format an organisational path.
    pub fn format_path(&self, path: &OrgPath) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(path),
            OutputFormat::Quiet => Ok(path.intermediate_count.to_string()),
            OutputFormat::Table => {
                let mut line = format!(
                    "{} → {}: {} step(s) ({})",
                    path.from,
                    path.to,
                    path.intermediate_count,
                    path.method.as_str()
                );
                if path.method.is_estimate() {
                    line = self.colorize(&format!("{} [estimate]", line), "yellow");
                }
                Ok(format!("{}\n  {}", line, ids(&path.path)))
            }
        }
    }

    /// Format resolved connections.
    pub fn format_connections(&self, connections: &[ResolvedConnection]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(connections),
            OutputFormat::Quiet => Ok(connections
                .iter()
                .map(|c| c.partner_id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if connections.is_empty() {
                    return Ok(self.colorize("No connections found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Partner", "Name", "Strength", "Distance", "Source", "Path", "Notes"]);
                for c in connections {
                    builder.push_record([
                        c.partner_id.to_string(),
                        c.partner_name.clone(),
                        c.strength.as_str().to_string(),
                        c.path_length.to_string(),
                        c.source.as_str().to_string(),
                        ids(&c.path),
                        c.notes.clone(),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format search hits.
    pub fn format_search(&self, hits: &[SearchHit]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(hits),
            OutputFormat::Quiet => Ok(hits
                .iter()
                .map(|h| h.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if hits.is_empty() {
                    return Ok(self.colorize("No employees found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Email", "Department", "Title", "Population", "Reports"]);
                for h in hits {
                    builder.push_record([
                        h.id.to_string(),
                        h.name.clone(),
                        h.email.clone(),
                        h.department.clone(),
                        h.designation.clone(),
                        h.population.as_str().to_string(),
                        h.reportee_count.to_string(),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format roster and cache statistics.
    pub fn format_stats(&self, stats: &ServiceStats, cache: &CacheStats) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({
                "roster": stats,
                "cache": cache,
            })),
            OutputFormat::Quiet => Ok(stats.roster.total.to_string()),
            OutputFormat::Table => {
                let r = &stats.roster;
                let h = &stats.hierarchy;
                let mut builder = Builder::default();
                builder.push_record(["Metric", "Value"]);
                for (name, value) in [
                    ("Snapshot version", stats.version as usize),
                    ("Employees", r.total),
                    ("Primary", r.primary),
                    ("Partner", r.partner),
                    ("Other", r.other),
                    ("Departments", r.departments),
                    ("Locations", r.locations),
                    ("Managers", r.managers),
                    ("Manager links", h.links),
                    ("Without manager", h.without_manager),
                    ("Unresolved managers", h.unresolved),
                    ("Declared connections", stats.connections.total),
                    ("  strong", stats.connections.strong),
                    ("  medium", stats.connections.medium),
                    ("  weak", stats.connections.weak),
                    ("  last 7 days", stats.connections.recent),
                    ("Declaring employees", stats.connections.declarers),
                    ("Declared partners", stats.connections.partners),
                ] {
                    builder.push_record([name.to_string(), value.to_string()]);
                }

                let mut out = vec![self.table(builder)];

                if !r.top_departments.is_empty() {
                    let mut builder = Builder::default();
                    builder.push_record(["Department", "Headcount"]);
                    for (dept, count) in &r.top_departments {
                        builder.push_record([dept.clone(), count.to_string()]);
                    }
                    out.push(self.table(builder));
                }

                out.push(cache.summary());
                Ok(out.join("\n"))
            }
        }
    }

    /// Format a warm-up report.
    pub fn format_warm(&self, report: &WarmReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(report),
            OutputFormat::Quiet => Ok(report.succeeded.to_string()),
            OutputFormat::Table if report.stopped_early => Ok(self.warning(&report.summary())),
            OutputFormat::Table => Ok(self.success(&report.summary())),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
