//! Watch command implementation.

use crate::cli::WatchArgs;
use crate::error::Result;
use crate::output::Formatter;
use qonnect_domain::RosterSource;
use qonnect_service::{OrgService, RefreshWorker, WarmTargets};
use std::sync::Arc;
use std::time::Duration;

/// Execute the watch command.
///
/// Runs the refresh worker on its own runtime until Ctrl+C, or for a fixed
/// number of cycles.
pub fn execute_watch<S>(args: WatchArgs, service: Arc<OrgService<S>>, formatter: &Formatter) -> Result<()>
where
    S: RosterSource + Send + Sync + 'static,
{
    let warm = &service.config().warm;
    if warm.on_startup {
        let report = service.warm(&WarmTargets::from_config(warm));
        println!("{}", formatter.format_warm(&report)?);
    }

    let mut worker = match args.interval_minutes {
        Some(minutes) => {
            let worker = RefreshWorker::new(Arc::clone(&service), Duration::from_secs(minutes.max(1) * 60));
            if warm.after_refresh {
                worker.with_warm(WarmTargets::from_config(warm))
            } else {
                worker
            }
        }
        None => RefreshWorker::from_config(Arc::clone(&service)),
    };

    println!("{}", formatter.info("Watching roster for changes (Ctrl+C to stop)"));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        match args.cycles {
            Some(cycles) => worker.run_cycles(cycles).await,
            None => worker.run().await,
        }
    })?;

    println!("{}", formatter.success("Refresh worker stopped"));
    Ok(())
}
