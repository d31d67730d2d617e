//! Hierarchical taxonomy index
//!
//! Built once from reference rows of `accountType, primary, secondary,
//! tertiary` and immutable afterwards. Account types compare
//! case-insensitively; the three classification levels compare exactly.
//!
//! The index never exposes a child list under an unset ([`UNKNOWN`]) or
//! absent parent.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{is_set, HierarchyPath, TaxonomyEntry};

type TertiarySet = BTreeSet<String>;
type SecondaryMap = BTreeMap<String, TertiarySet>;
type PrimaryMap = BTreeMap<String, SecondaryMap>;

/// Children of one account type, keyed under its first-seen spelling
#[derive(Debug, Clone, Default)]
struct AccountTypeNode {
    name: String,
    primaries: PrimaryMap,
}

/// Immutable index over the reference taxonomy
#[derive(Debug, Clone, Default)]
pub struct TaxonomyIndex {
    /// Unique entries in source order
    entries: Vec<TaxonomyEntry>,
    /// Lower-cased account type -> node
    tree: BTreeMap<String, AccountTypeNode>,
}

impl TaxonomyIndex {
    /// Build an index from already-validated entries. Duplicates and entries
    /// with an empty field are skipped.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = TaxonomyEntry>,
    {
        let mut index = Self::default();
        let mut seen = HashSet::new();

        for entry in entries {
            if !is_complete(&entry) {
                continue;
            }
            let key = (
                entry.account_type.to_lowercase(),
                entry.primary.clone(),
                entry.secondary.clone(),
                entry.tertiary.clone(),
            );
            if !seen.insert(key) {
                continue;
            }

            let node = index
                .tree
                .entry(entry.account_type.to_lowercase())
                .or_insert_with(|| AccountTypeNode {
                    name: entry.account_type.clone(),
                    primaries: PrimaryMap::new(),
                });
            node.primaries
                .entry(entry.primary.clone())
                .or_default()
                .entry(entry.secondary.clone())
                .or_default()
                .insert(entry.tertiary.clone());

            index.entries.push(entry);
        }

        index
    }

    /// Parse reference rows from CSV.
    ///
    /// The first row is a header and is discarded. Rows with fewer than four
    /// fields, or with any of the first four fields empty after trimming, are
    /// dropped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let record = result?;
            match parse_row(&record) {
                Some(entry) => rows.push(entry),
                None => {
                    dropped += 1;
                    debug!("Dropping malformed taxonomy row: {:?}", record);
                }
            }
        }

        if dropped > 0 {
            warn!("Dropped {} malformed taxonomy rows", dropped);
        }

        let index = Self::from_entries(rows);
        info!(
            "Loaded taxonomy: {} entries across {} account types",
            index.len(),
            index.tree.len()
        );
        Ok(index)
    }

    /// Load reference rows from a CSV file
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All unique entries in source order
    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    /// Entries whose account type equals `account_type`, ignoring case
    pub fn entries_for(&self, account_type: &str) -> impl Iterator<Item = &TaxonomyEntry> + '_ {
        let wanted = account_type.to_lowercase();
        self.entries
            .iter()
            .filter(move |e| e.account_type.to_lowercase() == wanted)
    }

    /// Sorted distinct account types
    pub fn unique_account_types(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.tree.values().map(|n| n.name.as_str()).collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Sorted primary classifications under an account type
    pub fn primary_options(&self, account_type: &str) -> Vec<String> {
        self.primaries(account_type)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Sorted secondary classifications under an account type and primary
    pub fn secondary_options(&self, account_type: &str, primary: &str) -> Vec<String> {
        self.secondaries(account_type, primary)
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Sorted tertiary classifications under the given ancestors
    pub fn tertiary_options(&self, account_type: &str, primary: &str, secondary: &str) -> Vec<String> {
        if !is_set(secondary) {
            return Vec::new();
        }
        self.secondaries(account_type, primary)
            .and_then(|s| s.get(secondary))
            .map(|t| t.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Canonical spelling of an account type, if present
    pub fn account_type_name(&self, account_type: &str) -> Option<&str> {
        if !is_set(account_type) {
            return None;
        }
        self.tree
            .get(&account_type.to_lowercase())
            .map(|n| n.name.as_str())
    }

    /// True if every level of `path` is set and the tuple exists
    pub fn contains(&self, path: &HierarchyPath) -> bool {
        if !is_set(&path.tertiary) {
            return false;
        }
        self.tertiary_options(&path.account_type, &path.primary, &path.secondary)
            .iter()
            .any(|t| t == &path.tertiary)
    }

    /// True if the set levels of `path` form a chain from its account type
    /// down, with nothing set below an unset level. A full path reduces to
    /// [`contains`](Self::contains).
    pub fn contains_prefix(&self, path: &HierarchyPath) -> bool {
        let levels = [
            path.primary.as_str(),
            path.secondary.as_str(),
            path.tertiary.as_str(),
        ];
        let depth = levels.iter().take_while(|l| is_set(l)).count();
        if levels[depth..].iter().any(|l| is_set(l)) {
            return false;
        }
        match depth {
            0 => self.account_type_name(&path.account_type).is_some(),
            1 => self
                .primaries(&path.account_type)
                .is_some_and(|p| p.contains_key(&path.primary)),
            2 => self
                .secondaries(&path.account_type, &path.primary)
                .is_some_and(|s| s.contains_key(&path.secondary)),
            _ => self.contains(path),
        }
    }

    /// Canonical account type holding the classification levels of `path`.
    ///
    /// The path's own account type wins when it holds them. Otherwise the
    /// first entry agreeing on every set level decides. `None` when no
    /// entry does, or when no level below the account type is set.
    pub fn owning_account_type(&self, path: &HierarchyPath) -> Option<&str> {
        if self.contains_prefix(path) {
            return self.account_type_name(&path.account_type);
        }
        if !is_set(&path.primary) {
            return None;
        }
        let agrees = |wanted: &str, actual: &str| !is_set(wanted) || wanted == actual;
        let owner = self.entries.iter().find(|e| {
            agrees(path.primary.as_str(), e.primary.as_str())
                && agrees(path.secondary.as_str(), e.secondary.as_str())
                && agrees(path.tertiary.as_str(), e.tertiary.as_str())
        })?;
        self.account_type_name(&owner.account_type)
    }

    fn primaries(&self, account_type: &str) -> Option<&PrimaryMap> {
        if !is_set(account_type) {
            return None;
        }
        self.tree
            .get(&account_type.to_lowercase())
            .map(|n| &n.primaries)
    }

    fn secondaries(&self, account_type: &str, primary: &str) -> Option<&SecondaryMap> {
        if !is_set(primary) {
            return None;
        }
        self.primaries(account_type).and_then(|p| p.get(primary))
    }
}

fn is_complete(entry: &TaxonomyEntry) -> bool {
    [
        &entry.account_type,
        &entry.primary,
        &entry.secondary,
        &entry.tertiary,
    ]
    .iter()
    .all(|v| !v.trim().is_empty())
}

fn parse_row(record: &csv::StringRecord) -> Option<TaxonomyEntry> {
    if record.len() < 4 {
        return None;
    }
    let field = |i: usize| record.get(i).map(str::trim).filter(|v| !v.is_empty());
    Some(TaxonomyEntry::new(field(0)?, field(1)?, field(2)?, field(3)?))
}
