//! Command implementations.

pub mod cache;
pub mod connections;
pub mod hierarchy;
pub mod init;
pub mod search;
pub mod watch;

pub use self::cache::{execute_invalidate, execute_purge, execute_warm};
pub use self::connections::{execute_connections, execute_declare};
pub use self::hierarchy::{execute_hierarchy, execute_path};
pub use self::init::execute_init;
pub use self::search::{execute_search, execute_stats};
pub use self::watch::execute_watch;

use qonnect_domain::{EmployeeId, RosterSource};
use qonnect_service::OrgService;

/// Turn a user-supplied handle into an employee id.
///
/// Handles that match nothing are used verbatim so the service can report
/// them as unknown.
pub fn resolve_handle<S: RosterSource>(service: &OrgService<S>, handle: &str) -> EmployeeId {
    service
        .find(handle)
        .unwrap_or_else(|| EmployeeId::new(handle))
}
