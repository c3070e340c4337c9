//! Cache warm-up
//!
//! Precomputes connection and hierarchy results for a set of employees so the
//! first real queries hit the cache. A run stops early once too many lookups
//! fail in a row, which usually means the roster is broken.
//!
//! Long runs can keep a [`WarmCheckpoint`] on disk; an interrupted or stopped
//! run resumes with the employees it has not processed yet.

use crate::config::WarmConfig;
use crate::service::OrgService;
use qonnect_domain::{EmployeeId, Population, RosterSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Which employees to warm
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarmTargets {
    /// An explicit list
    Employees(Vec<EmployeeId>),

    /// The first `n` Primary employees in roster order
    TopPrimary(usize),
}

impl WarmTargets {
    /// Targets described by the warm configuration
    pub fn from_config(config: &WarmConfig) -> Self {
        if config.employees.is_empty() {
            WarmTargets::TopPrimary(config.top_primary)
        } else {
            WarmTargets::Employees(config.employees.clone())
        }
    }
}

/// Outcome of one warm-up run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmReport {
    /// Employees looked up
    pub attempted: usize,

    /// Lookups that succeeded
    pub succeeded: usize,

    /// Lookups that failed
    pub failed: usize,

    /// Resolved connections now cached
    pub connections_cached: usize,

    /// Targets skipped because a checkpoint already had them
    #[serde(default)]
    pub skipped: usize,

    /// True when the run stopped on consecutive failures
    pub stopped_early: bool,

    /// Wall time of the run in milliseconds
    pub elapsed_ms: u64,
}

impl WarmReport {
    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Warmed {}/{} employees ({} connections cached, {} failed) in {}ms",
            self.succeeded, self.attempted, self.connections_cached, self.failed, self.elapsed_ms
        );
        if self.skipped > 0 {
            line.push_str(&format!(", {} already done", self.skipped));
        }
        if self.stopped_early {
            line.push_str(", stopped early");
        }
        line
    }
}

/// Progress of a resumable warm-up, stored as JSON between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmCheckpoint {
    /// Employees already looked up, successfully or not
    pub processed: Vec<EmployeeId>,

    /// Successful lookups across all runs
    pub succeeded: usize,

    /// Failed lookups across all runs
    pub failed: usize,
}

impl WarmCheckpoint {
    /// Read a checkpoint; a missing or unreadable file starts from scratch
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Warm checkpoint unreadable, starting fresh");
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&contents) {
            Ok(checkpoint) => {
                info!(
                    path = %path.display(),
                    processed = checkpoint.processed.len(),
                    "Warm checkpoint loaded"
                );
                checkpoint
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Warm checkpoint corrupt, starting fresh");
                Self::default()
            }
        }
    }

    /// Write the checkpoint through a temporary file and rename
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, path)
    }

    fn record(&mut self, id: &EmployeeId, ok: bool) {
        self.processed.push(id.clone());
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

impl<S: RosterSource> OrgService<S> {
    /// Precompute connections and hierarchy views for `targets`
    pub fn warm(&self, targets: &WarmTargets) -> WarmReport {
        let ids = self.warm_ids(targets);
        self.warm_each(&ids, |_, _| {})
    }

    /// Like [`OrgService::warm`], resuming from and updating `checkpoint`
    ///
    /// Targets already in the checkpoint are skipped. The file is rewritten
    /// after every employee, so a run stopped at any point loses nothing.
    pub fn warm_resumable(&self, targets: &WarmTargets, checkpoint: &Path) -> WarmReport {
        let mut progress = WarmCheckpoint::load(checkpoint);
        let done: HashSet<EmployeeId> = progress.processed.iter().cloned().collect();

        let (pending, skipped): (Vec<EmployeeId>, Vec<EmployeeId>) = self
            .warm_ids(targets)
            .into_iter()
            .partition(|id| !done.contains(id));

        let mut report = self.warm_each(&pending, |id, ok| {
            progress.record(id, ok);
            if let Err(e) = progress.save(checkpoint) {
                warn!(path = %checkpoint.display(), error = %e, "Warm checkpoint not saved");
            }
        });
        report.skipped = skipped.len();
        report
    }

    fn warm_ids(&self, targets: &WarmTargets) -> Vec<EmployeeId> {
        match targets {
            WarmTargets::Employees(ids) => ids.clone(),
            WarmTargets::TopPrimary(n) => self
                .snapshot()
                .roster()
                .population(Population::Primary)
                .take(*n)
                .map(|e| e.id.clone())
                .collect(),
        }
    }

    fn warm_each<F>(&self, ids: &[EmployeeId], mut after_each: F) -> WarmReport
    where
        F: FnMut(&EmployeeId, bool),
    {
        let started = Instant::now();
        let max_failures = self.config().warm.max_consecutive_failures.max(1);
        let mut report = WarmReport::default();
        let mut consecutive = 0usize;

        for id in ids {
            report.attempted += 1;
            let outcome = self
                .get_connections(id)
                .and_then(|connections| self.get_hierarchy(id).map(|_| connections));

            match outcome {
                Ok(connections) => {
                    consecutive = 0;
                    report.succeeded += 1;
                    report.connections_cached += connections.len();
                    debug!(employee = %id, connections = connections.len(), "Warmed");
                    after_each(id, true);
                }
                Err(e) => {
                    consecutive += 1;
                    report.failed += 1;
                    warn!(employee = %id, error = %e, "Warm-up lookup failed");
                    after_each(id, false);
                    if consecutive >= max_failures {
                        warn!(consecutive, "Too many consecutive failures, stopping warm-up");
                        report.stopped_early = true;
                        break;
                    }
                }
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!("{}", report.summary());
        report
    }
}
