//! Override store: curated (predefined) and learned (historical) overrides
//!
//! Both tables are keyed by normalized entry text. The predefined table is
//! fixed once loaded; the historical table starts empty and grows only when a
//! caller confirms a classification. Neither is persisted.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::resolve_text;
use crate::error::Result;
use crate::models::{HierarchyPath, UNKNOWN};
use crate::normalize::normalize_text;

/// Embedded curated override table (compiled into binary)
const DEFAULT_OVERRIDES: &str = include_str!("../../../config/overrides.toml");

/// A forced classification for one entry name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    /// Implied account type; the caller's hint is used when absent
    pub account_type: Option<String>,
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl OverrideEntry {
    pub fn new(
        account_type: Option<String>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
        tertiary: impl Into<String>,
    ) -> Self {
        Self {
            account_type,
            primary: primary.into(),
            secondary: secondary.into(),
            tertiary: tertiary.into(),
        }
    }

    /// Override carrying a full path, including its account type
    pub fn from_path(path: &HierarchyPath) -> Self {
        Self::new(
            Some(path.account_type.clone()),
            path.primary.clone(),
            path.secondary.clone(),
            path.tertiary.clone(),
        )
    }

    /// Resolve to a full path, falling back to `hint` for the account type
    pub fn resolve(&self, hint: &str) -> HierarchyPath {
        let account_type = self
            .account_type
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(hint);
        HierarchyPath::new(
            account_type,
            self.primary.clone(),
            self.secondary.clone(),
            self.tertiary.clone(),
        )
    }
}

/// Predefined and historical override tables
#[derive(Debug, Clone, Default)]
pub struct OverrideStore {
    predefined: HashMap<String, OverrideEntry>,
    historical: HashMap<String, OverrideEntry>,
}

impl OverrideStore {
    /// Store with the given curated entries, keyed by raw entry name.
    /// Later duplicates of the same normalized name win.
    pub fn new<I, S>(predefined: I) -> Self
    where
        I: IntoIterator<Item = (S, OverrideEntry)>,
        S: AsRef<str>,
    {
        let mut table = HashMap::new();
        for (name, entry) in predefined {
            let key = normalize_text(name.as_ref());
            if key.is_empty() {
                warn!("Skipping override with empty entry name");
                continue;
            }
            table.insert(key, entry);
        }
        Self {
            predefined: table,
            historical: HashMap::new(),
        }
    }

    /// Store with no curated entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the user override table if present, else the embedded one
    pub fn load_default() -> Result<Self> {
        let content = resolve_text(None, "overrides.toml", DEFAULT_OVERRIDES)?;
        Self::from_toml(&content)
    }

    /// Load the curated table from an explicit file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = resolve_text(Some(path), "overrides.toml", DEFAULT_OVERRIDES)?;
        Self::from_toml(&content)
    }

    /// Parse a curated table (`[[override]]` array of tables)
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawOverrideFile = toml::from_str(content)?;
        let store = Self::new(raw.overrides.into_iter().map(|o| {
            let entry = OverrideEntry::new(
                o.account_type,
                o.primary.unwrap_or_else(|| UNKNOWN.to_string()),
                o.secondary.unwrap_or_else(|| UNKNOWN.to_string()),
                o.tertiary.unwrap_or_else(|| UNKNOWN.to_string()),
            );
            (o.entry, entry)
        }));
        info!("Loaded {} predefined overrides", store.predefined.len());
        Ok(store)
    }

    /// Curated override for normalized text
    pub fn predefined(&self, normalized: &str) -> Option<&OverrideEntry> {
        self.predefined.get(normalized)
    }

    /// Learned override for normalized text
    pub fn historical(&self, normalized: &str) -> Option<&OverrideEntry> {
        self.historical.get(normalized)
    }

    /// Record a confirmed classification for an entry name.
    ///
    /// Returns false if the name normalizes to nothing and was not stored.
    pub fn add_historical(&mut self, entry_text: &str, entry: OverrideEntry) -> bool {
        let key = normalize_text(entry_text);
        if key.is_empty() {
            warn!("Ignoring historical match for empty entry name {:?}", entry_text);
            return false;
        }
        debug!("Learned override for '{}'", key);
        self.historical.insert(key, entry);
        true
    }

    pub fn predefined_len(&self) -> usize {
        self.predefined.len()
    }

    pub fn historical_len(&self) -> usize {
        self.historical.len()
    }
}

#[derive(Debug, Deserialize)]
struct RawOverrideFile {
    #[serde(default, rename = "override")]
    overrides: Vec<RawOverride>,
}

#[derive(Debug, Deserialize)]
struct RawOverride {
    entry: String,
    account_type: Option<String>,
    primary: Option<String>,
    secondary: Option<String>,
    tertiary: Option<String>,
}
