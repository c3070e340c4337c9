//! Search and stats command implementations.

use crate::cli::SearchArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use qonnect_domain::RosterSource;
use qonnect_graph::{SearchOptions, MIN_QUERY_LEN};
use qonnect_service::OrgService;

/// Execute the search command.
pub fn execute_search<S: RosterSource>(
    args: SearchArgs,
    service: &OrgService<S>,
    formatter: &Formatter,
) -> Result<()> {
    if args.query.trim().chars().count() < MIN_QUERY_LEN {
        return Err(CliError::InvalidInput(format!(
            "Search text must be at least {} characters",
            MIN_QUERY_LEN
        )));
    }
    if args.limit == 0 {
        return Err(CliError::InvalidInput("Limit must be at least 1".to_string()));
    }

    let options = SearchOptions {
        limit: args.limit,
        population: args.population.map(Into::into),
    };
    let hits = service.search(&args.query, &options);
    println!("{}", formatter.format_search(&hits)?);
    Ok(())
}

/// Execute the stats command.
pub fn execute_stats<S: RosterSource>(service: &OrgService<S>, formatter: &Formatter) -> Result<()> {
    let stats = service.stats();
    let cache = service.cache_stats();
    println!("{}", formatter.format_stats(&stats, &cache)?);
    Ok(())
}
