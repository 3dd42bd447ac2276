//! finpulse CLI - Recurring charge detector
//!
//! Usage:
//!   finpulse detect --file CSV      Detect recurring charges
//!   finpulse normalize NAME...      Show merchant grouping keys
//!   finpulse config                 Print effective configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Detect {
            file,
            format,
            limit,
        } => commands::cmd_detect(config_path, &file, format, limit),
        Commands::Normalize { names } => commands::cmd_normalize(&names),
        Commands::Config { path } => commands::cmd_config(config_path, path),
    }
}
