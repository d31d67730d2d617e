//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// COA - Classify ledger entries against a chart of accounts
#[derive(Parser)]
#[command(name = "coa")]
#[command(about = "Chart-of-accounts classifier for ledger entry names", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Classification tree CSV (Account Type, Primary, Secondary, Tertiary)
    #[arg(long, global = true, default_value = "data/classification_tree.csv")]
    pub taxonomy: PathBuf,

    /// Matcher configuration TOML (defaults to the user config dir, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Predefined override table TOML (defaults to the user config dir, then built-in)
    #[arg(long, global = true)]
    pub overrides: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every entry in a ledger and export the results
    Classify {
        /// Ledger CSV: an "Entry Name" table or a raw sheet with section headings
        #[arg(short, long)]
        ledger: PathBuf,

        /// Confirmed corrections CSV, applied as learned matches before classifying
        #[arg(short, long)]
        corrections: Option<PathBuf>,

        /// Output file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Write the match log as JSON to this file
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Classify a single entry name and show the candidates considered
    Match {
        /// Entry name
        text: String,

        /// Account type hint (e.g., "Asset", "Expense")
        #[arg(short, long, default_value = "UNKNOWN")]
        account_type: String,
    },

    /// Show ranked options per classification level
    Suggest {
        /// Entry name or free text
        text: String,

        /// Account type hint used to scope word matches
        #[arg(short, long, default_value = "UNKNOWN")]
        account_type: String,
    },

    /// Check a classification path against the taxonomy
    Validate {
        #[arg(long, default_value = "UNKNOWN")]
        account_type: String,

        #[arg(long, default_value = "UNKNOWN")]
        primary: String,

        #[arg(long, default_value = "UNKNOWN")]
        secondary: String,

        #[arg(long, default_value = "UNKNOWN")]
        tertiary: String,
    },

    /// List taxonomy options at the deepest level whose parents are given
    Taxonomy {
        #[arg(long)]
        account_type: Option<String>,

        #[arg(long, requires = "account_type")]
        primary: Option<String>,

        #[arg(long, requires = "primary")]
        secondary: Option<String>,
    },
}
