//! tabclean CLI - apply cleaning operations to CSV/TSV files.

mod cli;
mod commands;
mod input;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Apply {
            file,
            operation,
            column,
            params,
            output,
            config,
            json,
        } => commands::apply::run(file, operation, column, params, output, config, json),

        Commands::Profile { file, column, json } => commands::profile::run(file, column, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so `--json` output on stdout stays clean.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
