//! Domain models for the classifier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for a hierarchy level that has not been resolved
pub const UNKNOWN: &str = "UNKNOWN";

/// Separator used when rendering a hierarchy as a single path
pub const PATH_SEPARATOR: &str = " > ";

/// Returns true if a level value is set (non-empty and not the sentinel)
pub fn is_set(value: &str) -> bool {
    !value.is_empty() && value != UNKNOWN
}

/// One valid row of the reference taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyEntry {
    pub account_type: String,
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl TaxonomyEntry {
    pub fn new(
        account_type: impl Into<String>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
        tertiary: impl Into<String>,
    ) -> Self {
        Self {
            account_type: account_type.into(),
            primary: primary.into(),
            secondary: secondary.into(),
            tertiary: tertiary.into(),
        }
    }

    /// Value of one of the three classification levels
    pub fn level(&self, level: MatchLevel) -> &str {
        match level {
            MatchLevel::Primary => &self.primary,
            MatchLevel::Secondary => &self.secondary,
            MatchLevel::Tertiary => &self.tertiary,
        }
    }

    /// "Asset > Cash > Cash Balances > Cash In Hand"
    pub fn display_path(&self) -> String {
        [
            self.account_type.as_str(),
            &self.primary,
            &self.secondary,
            &self.tertiary,
        ]
        .join(PATH_SEPARATOR)
    }

    pub fn to_path(&self) -> HierarchyPath {
        HierarchyPath {
            account_type: self.account_type.clone(),
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
            tertiary: self.tertiary.clone(),
        }
    }
}

/// A (possibly partial) classification tuple chosen by a user or an override.
///
/// Unset levels hold [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyPath {
    pub account_type: String,
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
}

impl HierarchyPath {
    pub fn new(
        account_type: impl Into<String>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
        tertiary: impl Into<String>,
    ) -> Self {
        Self {
            account_type: account_type.into(),
            primary: primary.into(),
            secondary: secondary.into(),
            tertiary: tertiary.into(),
        }
    }

    /// Path with only the account type set
    pub fn unknown(account_type: impl Into<String>) -> Self {
        Self::new(account_type, UNKNOWN, UNKNOWN, UNKNOWN)
    }

    pub fn display(&self) -> String {
        [
            self.account_type.as_str(),
            &self.primary,
            &self.secondary,
            &self.tertiary,
        ]
        .join(PATH_SEPARATOR)
    }

    pub fn get(&self, level: HierarchyLevel) -> &str {
        match level {
            HierarchyLevel::AccountType => &self.account_type,
            HierarchyLevel::Primary => &self.primary,
            HierarchyLevel::Secondary => &self.secondary,
            HierarchyLevel::Tertiary => &self.tertiary,
        }
    }
}

/// How the winning candidate was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Word,
    Fuzzy,
    None,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Word => "word",
            Self::Fuzzy => "fuzzy",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the winning classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    /// Curated override table
    Predefined,
    /// Learned from a confirmed user correction
    Historical,
    /// Search hit on the primary classification
    Primary,
    /// Search hit on the secondary classification
    Secondary,
    /// Search hit on the tertiary classification
    Tertiary,
    /// Nothing matched
    #[serde(rename = "none")]
    Unmatched,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Predefined => "predefined",
            Self::Historical => "historical",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Unmatched => "none",
        }
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<MatchLevel> for MatchSource {
    fn from(level: MatchLevel) -> Self {
        match level {
            MatchLevel::Primary => Self::Primary,
            MatchLevel::Secondary => Self::Secondary,
            MatchLevel::Tertiary => Self::Tertiary,
        }
    }
}

/// The taxonomy field a search candidate matched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
    Primary,
    Secondary,
    Tertiary,
}

impl MatchLevel {
    /// Levels in priority order
    pub fn all() -> &'static [MatchLevel] {
        &[Self::Primary, Self::Secondary, Self::Tertiary]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
        }
    }
}

/// A level of the full hierarchy, including the account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HierarchyLevel {
    AccountType,
    Primary,
    Secondary,
    Tertiary,
}

impl HierarchyLevel {
    pub fn all() -> &'static [HierarchyLevel] {
        &[
            Self::AccountType,
            Self::Primary,
            Self::Secondary,
            Self::Tertiary,
        ]
    }

    /// Human-readable name used in validation messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::AccountType => "account type",
            Self::Primary => "primary classification",
            Self::Secondary => "secondary classification",
            Self::Tertiary => "tertiary classification",
        }
    }
}

/// One ranked alternative considered by a search stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatch {
    pub entry: TaxonomyEntry,
    pub display_path: String,
    pub confidence: f64,
    pub match_type: MatchType,
    pub match_level: MatchLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_words: Option<Vec<String>>,
}

impl CandidateMatch {
    pub fn new(
        entry: &TaxonomyEntry,
        confidence: f64,
        match_type: MatchType,
        match_level: MatchLevel,
    ) -> Self {
        Self {
            display_path: entry.display_path(),
            entry: entry.clone(),
            confidence,
            match_type,
            match_level,
            matched_words: None,
        }
    }

    pub fn with_matched_words(mut self, words: Vec<String>) -> Self {
        self.matched_words = Some(words);
        self
    }
}

/// Result of classifying one entry name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub account_type: String,
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
    pub confidence: f64,
    pub match_type: MatchType,
    pub match_source: MatchSource,
    pub possible_matches: Vec<CandidateMatch>,
}

impl Classification {
    /// Classification taken from a search candidate
    pub fn from_candidate(candidate: &CandidateMatch, possible_matches: Vec<CandidateMatch>) -> Self {
        Self {
            account_type: candidate.entry.account_type.clone(),
            primary: candidate.entry.primary.clone(),
            secondary: candidate.entry.secondary.clone(),
            tertiary: candidate.entry.tertiary.clone(),
            confidence: candidate.confidence,
            match_type: candidate.match_type,
            match_source: candidate.match_level.into(),
            possible_matches,
        }
    }

    /// Classification forced by an override
    pub fn from_override(path: &HierarchyPath, confidence: f64, source: MatchSource) -> Self {
        Self {
            account_type: path.account_type.clone(),
            primary: path.primary.clone(),
            secondary: path.secondary.clone(),
            tertiary: path.tertiary.clone(),
            confidence,
            match_type: MatchType::Exact,
            match_source: source,
            possible_matches: Vec::new(),
        }
    }

    /// Explicit "no match" result: only the account type hint is kept
    pub fn no_match(account_type: &str, possible_matches: Vec<CandidateMatch>) -> Self {
        Self {
            account_type: account_type.to_string(),
            primary: UNKNOWN.to_string(),
            secondary: UNKNOWN.to_string(),
            tertiary: UNKNOWN.to_string(),
            confidence: 0.0,
            match_type: MatchType::None,
            match_source: MatchSource::Unmatched,
            possible_matches,
        }
    }

    pub fn path(&self) -> HierarchyPath {
        HierarchyPath::new(
            self.account_type.clone(),
            self.primary.clone(),
            self.secondary.clone(),
            self.tertiary.clone(),
        )
    }

    pub fn is_match(&self) -> bool {
        self.match_type != MatchType::None
    }
}

/// Pipeline stage that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Predefined,
    Historical,
    Exact,
    Word,
    Fuzzy,
    NoMatch,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Predefined => "predefined",
            Self::Historical => "historical",
            Self::Exact => "exact",
            Self::Word => "word",
            Self::Fuzzy => "fuzzy",
            Self::NoMatch => "no_match",
        }
    }
}

/// Diagnostic record of one classification attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchLogEntry {
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub account_type_hint: String,
    pub normalized: String,
    pub tokens: Vec<String>,
    pub stage: MatchStage,
    /// Every candidate the deciding stage considered, best first
    pub candidates: Vec<CandidateMatch>,
    /// Display path of the result, `None` when nothing matched
    pub result: Option<String>,
    pub confidence: f64,
}

/// Plain value/label pair for selection widgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
}

impl OptionItem {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Option with the best confidence any search gave it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOption {
    pub value: String,
    pub label: String,
    pub confidence: f64,
}

impl RankedOption {
    pub fn new(value: impl Into<String>, confidence: f64) -> Self {
        let value = value.into();
        Self {
            label: format!("{} ({:.0}%)", value, confidence * 100.0),
            value,
            confidence,
        }
    }
}

/// Ranked options per hierarchy level for interactive correction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestions {
    /// Always the full account type list, unranked
    pub account_type: Vec<OptionItem>,
    pub primary: Vec<RankedOption>,
    pub secondary: Vec<RankedOption>,
    pub tertiary: Vec<RankedOption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationErrorKind {
    /// Level left at UNKNOWN
    Missing,
    /// Value not a legal child of its ancestors
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub level: HierarchyLevel,
    pub kind: ValidationErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// One entry to classify, as read from a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    /// 1-based row number in the source file
    pub row_number: usize,
    pub entry_name: String,
    pub account_type_hint: String,
}

/// A ledger row together with its classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRow {
    pub row: LedgerRow,
    pub classification: Classification,
}
