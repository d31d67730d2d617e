//! Shared setup for commands
//!
//! This module contains:
//! - `Sources` - Paths to the taxonomy, config and override files
//! - `load_taxonomy` - Load the classification tree
//! - `build_matcher` - Assemble a matcher from the three sources

use std::path::Path;

use anyhow::{Context, Result};
use coa_core::{Matcher, MatcherConfig, OverrideStore, TaxonomyIndex};
use tracing::info;

/// Where the matcher's reference data comes from
pub struct Sources<'a> {
    pub taxonomy: &'a Path,
    pub config: Option<&'a Path>,
    pub overrides: Option<&'a Path>,
}

pub fn load_taxonomy(path: &Path) -> Result<TaxonomyIndex> {
    let taxonomy = TaxonomyIndex::from_path(path)
        .with_context(|| format!("Failed to load taxonomy: {}", path.display()))?;
    if taxonomy.is_empty() {
        anyhow::bail!(
            "Taxonomy {} has no usable rows.\n\
             Expected columns: Account Type, Primary, Secondary, Tertiary",
            path.display()
        );
    }
    Ok(taxonomy)
}

/// Load taxonomy, config and overrides, falling back to the user config dir
/// and then the built-in defaults for the latter two
pub fn build_matcher(sources: &Sources<'_>) -> Result<Matcher> {
    let taxonomy = load_taxonomy(sources.taxonomy)?;

    let config = match sources.config {
        Some(path) => MatcherConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => MatcherConfig::load().context("Failed to load matcher config")?,
    };

    let overrides = match sources.overrides {
        Some(path) => OverrideStore::from_path(path)
            .with_context(|| format!("Failed to load overrides: {}", path.display()))?,
        None => OverrideStore::load_default().context("Failed to load overrides")?,
    };

    info!(
        "Matcher ready: {} taxonomy entries, {} predefined overrides",
        taxonomy.len(),
        overrides.predefined_len()
    );

    Ok(Matcher::new(taxonomy, overrides, config))
}
