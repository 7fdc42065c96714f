//! Datasight CLI - deterministic business analytics for tabular data.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Analyze { file, output, json } => {
            commands::analyze::run(file, output, json, cli.verbose)
        }

        Commands::Ask {
            file,
            question,
            enricher,
        } => commands::ask::run(file, question, enricher),

        Commands::Serve {
            file,
            port,
            enricher,
            rate_limit,
        } => commands::serve::run(file, port, enricher, rate_limit),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
