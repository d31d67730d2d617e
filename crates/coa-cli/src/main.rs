//! COA CLI - Chart-of-accounts classifier
//!
//! Usage:
//!   coa classify --ledger TB.csv        Classify a ledger and export results
//!   coa match "Petty Cash" -a Asset     Classify one entry name
//!   coa suggest "staff lunch"           Ranked options per level
//!   coa validate --account-type ...     Check a classification path
//!   coa taxonomy --account-type Asset   Browse the classification tree

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use coa_core::{ExportFormat, HierarchyPath};
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

    let sources = commands::Sources {
        taxonomy: &cli.taxonomy,
        config: cli.config.as_deref(),
        overrides: cli.overrides.as_deref(),
    };

    match cli.command {
        Commands::Classify {
            ledger,
            corrections,
            output,
            format,
            log,
        } => {
            let format: ExportFormat = format.parse()?;
            let mut matcher = commands::build_matcher(&sources)?;
            commands::cmd_classify(
                &mut matcher,
                &ledger,
                corrections.as_deref(),
                output.as_deref(),
                format,
                log.as_deref(),
            )?;
            Ok(())
        }
        Commands::Match { text, account_type } => {
            let mut matcher = commands::build_matcher(&sources)?;
            commands::cmd_match(&mut matcher, &text, &account_type)
        }
        Commands::Suggest { text, account_type } => {
            let matcher = commands::build_matcher(&sources)?;
            commands::cmd_suggest(&matcher, &text, &account_type)
        }
        Commands::Validate {
            account_type,
            primary,
            secondary,
            tertiary,
        } => {
            let matcher = commands::build_matcher(&sources)?;
            let path = HierarchyPath::new(account_type, primary, secondary, tertiary);
            commands::cmd_validate(&matcher, &path)
        }
        Commands::Taxonomy {
            account_type,
            primary,
            secondary,
        } => {
            let taxonomy = commands::load_taxonomy(&cli.taxonomy)?;
            commands::cmd_taxonomy(
                &taxonomy,
                account_type.as_deref(),
                primary.as_deref(),
                secondary.as_deref(),
            )
        }
    }
}
