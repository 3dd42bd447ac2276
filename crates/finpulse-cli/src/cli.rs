//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// finpulse - Spot the recurring charges in your spending
#[derive(Parser)]
#[command(name = "finpulse")]
#[command(about = "Recurring charge detector for personal finance exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect recurring charges in a CSV of outflow transactions
    Detect {
        /// CSV file with date,name,amount columns
        #[arg(short, long)]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Only scan the newest N transactions (defaults to config import.max_transactions)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the grouping key a merchant name normalizes to
    Normalize {
        /// Raw merchant names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print the effective configuration
    Config {
        /// Print the override file location instead
        #[arg(long)]
        path: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
