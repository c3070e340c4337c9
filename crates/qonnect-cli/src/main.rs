//! Qonnect CLI - Command-line interface for organisational hierarchy and partner connections.

use clap::Parser;
use qonnect_cli::commands;
use qonnect_cli::config::OutputFormat;
use qonnect_cli::{Cli, Command, Config, Formatter};
use qonnect_service::{JsonRosterSource, OrgService};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> qonnect_cli::Result<()> {
    // Init writes the file, so it must not require one
    let command = match cli.command {
        Command::Init(args) => {
            let format = cli.format.map(Into::into).unwrap_or(OutputFormat::Table);
            let formatter = Formatter::new(format, !cli.no_color);
            return commands::execute_init(args, cli.config.as_deref(), &formatter);
        }
        other => other,
    };

    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(
        employees = %config.service.roster.employees_path.display(),
        connections = %config.service.roster.connections_path.display(),
        "Configuration loaded"
    );

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    let source = JsonRosterSource::new(&config.service.roster);
    let service = Arc::new(OrgService::open(source, config.service)?);
    let svc = service.as_ref();

    match command {
        Command::Hierarchy(args) => commands::execute_hierarchy(args, svc, &formatter)?,
        Command::Path(args) => commands::execute_path(args, svc, &formatter)?,
        Command::Connections(args) => commands::execute_connections(args, svc, &formatter)?,
        Command::Search(args) => commands::execute_search(args, svc, &formatter)?,
        Command::Stats => commands::execute_stats(svc, &formatter)?,
        Command::Declare(args) => commands::execute_declare(args, svc, &formatter)?,
        Command::Invalidate => commands::execute_invalidate(svc, &formatter)?,
        Command::Purge => commands::execute_purge(svc, &formatter)?,
        Command::Warm(args) => commands::execute_warm(args, svc, &formatter)?,
        Command::Watch(args) => commands::execute_watch(args, Arc::clone(&service), &formatter)?,
        Command::Init(_) => {}
    }

    Ok(())
}
