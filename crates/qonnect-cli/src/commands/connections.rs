//! Connection command implementations.

use super::resolve_handle;
use crate::cli::{ConnectionsArgs, DeclareArgs};
use crate::error::Result;
use crate::output::Formatter;
use qonnect_domain::{DeclaredConnection, RosterSource};
use qonnect_service::OrgService;

/// Execute the connections command.
pub fn execute_connections<S: RosterSource>(
    args: ConnectionsArgs,
    service: &OrgService<S>,
    formatter: &Formatter,
) -> Result<()> {
    let id = resolve_handle(service, &args.employee);
    let mut connections = service.get_connections(&id)?;
    if let Some(limit) = args.limit {
        connections.truncate(limit);
    }
    println!("{}", formatter.format_connections(&connections)?);
    Ok(())
}

/// Execute the declare command.
pub fn execute_declare<S: RosterSource>(
    args: DeclareArgs,
    service: &OrgService<S>,
    formatter: &Formatter,
) -> Result<()> {
    let from = resolve_handle(service, &args.from);
    let to = resolve_handle(service, &args.to);

    let mut connection = DeclaredConnection::new(from.as_str(), to.as_str(), args.strength.into());
    connection.declared_by = args.declared_by;
    connection.notes = args.notes;

    service.declare_connection(connection)?;
    println!(
        "{}",
        formatter.success(&format!("Connection declared: {} → {}", from, to))
    );
    Ok(())
}
