//! Tally CLI - transaction classifier with a correction log
//!
//! Usage:
//!   tally classify                 Classify the whole table
//!   tally auto --threshold 0.85    Apply confident suggestions
//!   tally set 12 "Fuel"            Correct one row (recorded)
//!   tally batch 12 "Fuel"          Correct all matching rows (recorded)

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
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Classify => commands::cmd_classify(&cli.rules, &cli.table),
        Commands::Auto { threshold } => commands::cmd_auto(&cli.rules, &cli.table, threshold),
        Commands::Fill { history } => commands::cmd_fill(&cli.table, &history),
        Commands::Suggest { row, history } => {
            commands::cmd_suggest(&cli.rules, &cli.table, row, &history)
        }
        Commands::Set { row, category } => {
            commands::cmd_set(&cli.rules, &cli.table, &cli.log, row, &category)
        }
        Commands::Batch { row, category } => {
            commands::cmd_batch(&cli.rules, &cli.table, &cli.log, row, &category)
        }
        Commands::Close => commands::cmd_close(&cli.table, &cli.log),
        Commands::Status => commands::cmd_status(&cli.table),
        Commands::Check => commands::cmd_check(&cli.table),
        Commands::Sessions => commands::cmd_sessions(&cli.log),
        Commands::Categories => commands::cmd_categories(&cli.rules),
    }
}
