//! Rootstash CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use rootstash::cli::Cli;
use rootstash::commands;

fn main() {
    let cli = Cli::parse();

    // Logs share stderr with git; stdout is reserved for listings.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();

    match commands::execute(cli.command, &config) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(commands::EXIT_FAILURE);
        }
    }
}
