//! Background worker for periodic roster refresh

use crate::error::ServiceError;
use crate::service::OrgService;
use crate::warm::WarmTargets;
use qonnect_domain::RosterSource;
use std::sync::Arc;
use tokio::time::{interval, Duration};

/// Counters kept across refresh cycles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshMetrics {
    /// Cycles run
    pub cycles: u64,

    /// Reloads that succeeded
    pub reloads: u64,

    /// Reloads that failed (the previous snapshot stayed in place)
    pub failures: u64,

    /// Expired cache entries purged
    pub purged: u64,

    /// Employees warmed
    pub warmed: u64,
}

impl RefreshMetrics {
    /// Generate a summary report
    pub fn summary(&self) -> String {
        [
            format!("Cycles: {}", self.cycles),
            format!("Reloads: {} ok, {} failed", self.reloads, self.failures),
            format!("Purged cache entries: {}", self.purged),
            format!("Employees warmed: {}", self.warmed),
        ]
        .join("\n")
    }
}

/// Background worker that reloads the roster on a schedule
///
/// Each cycle reloads from the source, purges expired cache entries and,
/// when configured, warms the cache again. The blocking work runs on the
/// blocking thread pool.
///
/// # Examples
///
/// ```no_run
/// use qonnect_service::{OrgService, QonnectConfig, RefreshWorker, StaticRoster};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = Arc::new(OrgService::new(StaticRoster::default(), QonnectConfig::default()));
///     let mut worker = RefreshWorker::from_config(service);
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run().await?;
///     Ok(())
/// }
/// ```
pub struct RefreshWorker<S> {
    service: Arc<OrgService<S>>,
    interval: Duration,
    warm: Option<WarmTargets>,
    metrics: RefreshMetrics,
}

impl<S> RefreshWorker<S>
where
    S: RosterSource + Send + Sync + 'static,
{
    /// Create a worker with an explicit interval and no warm-up
    pub fn new(service: Arc<OrgService<S>>, interval: Duration) -> Self {
        Self {
            service,
            interval,
            warm: None,
            metrics: RefreshMetrics::default(),
        }
    }

    /// Create a worker using the service's refresh and warm settings
    pub fn from_config(service: Arc<OrgService<S>>) -> Self {
        let config = service.config();
        let interval = config.roster.refresh_interval();
        let warm = config
            .warm
            .after_refresh
            .then(|| WarmTargets::from_config(&config.warm));
        Self {
            service,
            interval,
            warm,
            metrics: RefreshMetrics::default(),
        }
    }

    /// Warm `targets` after every reload
    pub fn with_warm(mut self, targets: WarmTargets) -> Self {
        self.warm = Some(targets);
        self
    }

    /// Metrics collected so far
    pub fn metrics(&self) -> &RefreshMetrics {
        &self.metrics
    }

    async fn cycle(&mut self) -> Result<(), ServiceError> {
        let service = Arc::clone(&self.service);
        let warm = self.warm.clone();

        let (reload, purged, warm_report) = tokio::task::spawn_blocking(move || {
            let reload = service.reload();
            let purged = service.purge_expired();
            let warm_report = match (&reload, warm) {
                (Ok(_), Some(targets)) => Some(service.warm(&targets)),
                _ => None,
            };
            (reload, purged, warm_report)
        })
        .await
        .map_err(|e| ServiceError::Worker(e.to_string()))?;

        self.metrics.cycles += 1;
        self.metrics.purged += purged as u64;
        match reload {
            Ok(report) => {
                self.metrics.reloads += 1;
                tracing::info!(
                    "Refresh completed: version {}, {} employees, {} connections, {} purged",
                    report.version,
                    report.employees,
                    report.connections,
                    purged
                );
            }
            Err(e) => {
                self.metrics.failures += 1;
                tracing::error!("Refresh failed, keeping previous roster: {}", e);
            }
        }
        if let Some(report) = warm_report {
            self.metrics.warmed += report.succeeded as u64;
        }
        Ok(())
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task panics; reload failures are
    /// logged and the previous snapshot keeps serving.
    pub async fn run(&mut self) -> Result<(), ServiceError> {
        let mut ticker = interval(self.interval);

        tracing::info!("Refresh worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("Starting refresh cycle");
                    self.cycle().await?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping refresh worker");
                    break;
                }
            }
        }

        tracing::info!("Refresh worker stopped. Final metrics:\n{}", self.metrics.summary());
        Ok(())
    }

    /// Run for a specific number of cycles (useful for testing)
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<(), ServiceError> {
        let mut ticker = interval(self.interval);

        for i in 0..cycles {
            ticker.tick().await;
            tracing::info!("Running refresh cycle {}/{}", i + 1, cycles);
            self.cycle().await?;
        }

        tracing::info!("Completed {} cycles. Metrics:\n{}", cycles, self.metrics.summary());
        Ok(())
    }
}
