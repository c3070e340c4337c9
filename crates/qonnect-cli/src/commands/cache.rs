//! Cache maintenance command implementations.

use super::resolve_handle;
use crate::cli::WarmArgs;
use crate::error::Result;
use crate::output::Formatter;
use qonnect_domain::RosterSource;
use qonnect_service::{OrgService, WarmTargets};

/// Execute the invalidate command.
pub fn execute_invalidate<S: RosterSource>(service: &OrgService<S>, formatter: &Formatter) -> Result<()> {
    service.invalidate_caches();
    println!("{}", formatter.success("All cache layers invalidated"));
    Ok(())
}

/// Execute the purge command.
pub fn execute_purge<S: RosterSource>(service: &OrgService<S>, formatter: &Formatter) -> Result<()> {
    let removed = service.purge_expired();
    println!("{}", formatter.success(&format!("Purged {} expired entr(ies)", removed)));
    Ok(())
}

/// Execute the warm command.
pub fn execute_warm<S: RosterSource>(
    args: WarmArgs,
    service: &OrgService<S>,
    formatter: &Formatter,
) -> Result<()> {
    let targets = match (args.top, args.employees.is_empty()) {
        (Some(n), _) => WarmTargets::TopPrimary(n),
        (None, false) => WarmTargets::Employees(
            args.employees
                .iter()
                .map(|handle| resolve_handle(service, handle))
                .collect(),
        ),
        (None, true) => WarmTargets::from_config(&service.config().warm),
    };

    let checkpoint = args
        .checkpoint
        .or_else(|| service.config().warm.checkpoint_path.clone());

    let report = match checkpoint {
        Some(path) => {
            if args.fresh && path.exists() {
                std::fs::remove_file(&path)?;
                println!("{}", formatter.info(&format!("Discarded progress in {}", path.display())));
            }
            service.warm_resumable(&targets, &path)
        }
        None => service.warm(&targets),
    };
    println!("{}", formatter.format_warm(&report)?);
    Ok(())
}
