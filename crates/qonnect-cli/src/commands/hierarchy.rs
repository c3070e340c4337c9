//! Hierarchy and path command implementations.

use super::resolve_handle;
use crate::cli::{HierarchyArgs, PathArgs};
use crate::error::Result;
use crate::output::Formatter;
use qonnect_domain::RosterSource;
use qonnect_service::OrgService;

/// Execute the hierarchy command.
pub fn execute_hierarchy<S: RosterSource>(
    args: HierarchyArgs,
    service: &OrgService<S>,
    formatter: &Formatter,
) -> Result<()> {
    let id = resolve_handle(service, &args.employee);
    let view = service.get_hierarchy(&id)?;
    println!("{}", formatter.format_hierarchy(&view)?);
    Ok(())
}

/// Execute the path command.
pub fn execute_path<S: RosterSource>(
    args: PathArgs,
    service: &OrgService<S>,
    formatter: &Formatter,
) -> Result<()> {
    let from = resolve_handle(service, &args.from);
    let to = resolve_handle(service, &args.to);
    let path = service.get_organizational_path(&from, &to);
    println!("{}", formatter.format_path(&path)?);
    Ok(())
}
