//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use qonnect_domain::{ConnectionStrength, Population};
use std::path::PathBuf;

/// Qonnect CLI - Explore reporting lines and partner connections.
#[derive(Debug, Parser)]
#[command(name = "qonnect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "QONNECT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show an employee's place in the hierarchy
    Hierarchy(HierarchyArgs),

    /// Measure the organisational distance between two employees
    Path(PathArgs),

    /// List the partner employees a primary employee can reach
    Connections(ConnectionsArgs),

    /// Search the roster by name, id, email, department or title
    Search(SearchArgs),

    /// Show roster and cache statistics
    Stats,

    /// Declare a connection from a primary to a partner employee
    Declare(DeclareArgs),

    /// Drop every cached result
    Invalidate,

    /// Remove expired entries from the durable cache layers
    Purge,

    /// Precompute results for a set of employees
    Warm(WarmArgs),

    /// Reload the roster periodically until interrupted
    Watch(WatchArgs),

    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the hierarchy command.
#[derive(Debug, Parser)]
pub struct HierarchyArgs {
    /// Employee id, email, email prefix or unique name
    pub employee: String,
}

/// Arguments for the path command.
#[derive(Debug, Parser)]
pub struct PathArgs {
    /// Start of the path
    pub from: String,

    /// End of the path
    pub to: String,
}

/// Arguments for the connections command.
#[derive(Debug, Parser)]
pub struct ConnectionsArgs {
    /// Employee id, email, email prefix or unique name
    pub employee: String,

    /// Maximum number of connections to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the search command.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Search text (at least two characters)
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value = "25")]
    pub limit: usize,

    /// Only return employees of this population
    #[arg(short, long, value_enum)]
    pub population: Option<PopulationArg>,
}

/// Arguments for the declare command.
#[derive(Debug, Parser)]
pub struct DeclareArgs {
    /// Primary employee making the declaration
    pub from: String,

    /// Partner employee being connected to
    pub to: String,

    /// Connection strength
    #[arg(short, long, value_enum, default_value = "medium")]
    pub strength: StrengthArg,

    /// Free-form notes
    #[arg(short, long, default_value = "")]
    pub notes: String,

    /// Who is recording the declaration
    #[arg(long, env = "USER", default_value = "")]
    pub declared_by: String,
}

/// Arguments for the warm command.
#[derive(Debug, Parser)]
pub struct WarmArgs {
    /// Employees to warm; defaults to the configured set
    pub employees: Vec<String>,

    /// Warm the first N primary employees instead
    #[arg(short, long, conflicts_with = "employees")]
    pub top: Option<usize>,

    /// Resume from and update this progress file
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Discard any saved progress before starting
    #[arg(long)]
    pub fresh: bool,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Refresh interval in minutes; defaults to the configured interval
    #[arg(short, long)]
    pub interval_minutes: Option<u64>,

    /// Stop after this many refresh cycles
    #[arg(long)]
    pub cycles: Option<usize>,
}

/// Arguments for the init command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Population argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PopulationArg {
    /// Internal organisation
    Primary,
    /// External partner
    Partner,
    /// Everyone else
    Other,
}

impl From<PopulationArg> for Population {
    fn from(arg: PopulationArg) -> Self {
        match arg {
            PopulationArg::Primary => Population::Primary,
            PopulationArg::Partner => Population::Partner,
            PopulationArg::Other => Population::Other,
        }
    }
}

/// Connection strength argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StrengthArg {
    /// Direct working relationship
    Strong,
    /// Occasional collaboration
    Medium,
    /// Acquaintance
    Weak,
}

impl From<StrengthArg> for ConnectionStrength {
    fn from(arg: StrengthArg) -> Self {
        match arg {
            StrengthArg::Strong => ConnectionStrength::Strong,
            StrengthArg::Medium => ConnectionStrength::Medium,
            StrengthArg::Weak => ConnectionStrength::Weak,
        }
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
