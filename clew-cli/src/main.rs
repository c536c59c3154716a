use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use clew_core::ClewError;

fn main() {
    // Initialize logging with CLEW_LOG environment variable support
    let log_level = std::env::var("CLEW_LOG").unwrap_or_else(|_| "warn".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        // Use appropriate exit codes based on error type
        let exit_code = match e.downcast_ref::<ClewError>() {
            Some(ClewError::Configuration(_)) => 2,
            Some(ClewError::Io(_)) => 3,
            Some(ClewError::Parse(_) | ClewError::MalformedModel { .. }) => 4,
            Some(ClewError::Tool(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let num_threads = if cli.threads == 0 {
        num_cpus::get()
    } else {
        cli.threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .expect("Failed to initialize thread pool");

    if cli.verbose > 0 {
        eprintln!("Using {} threads", num_threads);
    }

    match cli.command {
        Commands::Prepare(args) => crate::cli::commands::prepare::run(args),
        Commands::Align(args) => crate::cli::commands::align::run(args, num_threads),
        Commands::Train { command } => crate::cli::commands::train::run(command),
    }
}
