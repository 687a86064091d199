//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - classify bank transactions and learn from corrections
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Keyword-rule transaction classifier with a correction log", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Rule set file (JSON array, declaration order is priority)
    #[arg(long, default_value = "config/rules.json", global = true)]
    pub rules: PathBuf,

    /// Transaction table (CSV)
    #[arg(long, default_value = "transactions.csv", global = true)]
    pub table: PathBuf,

    /// Learning log file (JSON, append-only)
    #[arg(long, default_value = "learning.json", global = true)]
    pub log: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every transaction in the table, overwriting categories
    Classify,

    /// Apply confident rule suggestions to uncategorized rows
    Auto {
        /// Minimum confidence to apply without review (0.70-1.00)
        #[arg(short, long, default_value_t = 0.85)]
        threshold: f64,
    },

    /// Fill uncategorized rows from exact matches in validated tables
    Fill {
        /// Previously validated transaction tables (CSV)
        #[arg(required = true)]
        history: Vec<PathBuf>,
    },

    /// Show the rule and history suggestions for one row
    Suggest {
        /// Row number (0-based, as printed by `status`)
        row: usize,

        /// Validated tables to consult for the history suggestion
        #[arg(long)]
        history: Vec<PathBuf>,
    },

    /// Set one row's category manually, recording the decision
    Set {
        /// Row number (0-based)
        row: usize,

        /// New category label
        category: String,
    },

    /// Propagate a category to every row with the reference's bank and
    /// description, recording one decision per changed row
    Batch {
        /// Reference row number (0-based)
        row: usize,

        /// New category label
        category: String,
    },

    /// Finalize the open learning session and stamp its totals
    Close,

    /// Show table statistics and per-category counts
    Status,

    /// Check the table for debit/credit violations and duplicates
    Check,

    /// List recorded learning sessions
    Sessions,

    /// List the categories the rule set can assign
    Categories,
}
