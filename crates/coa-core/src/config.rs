//! Matcher configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/coa/config/matching.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::MatchLevel;
use crate::normalize::DEFAULT_MIN_TOKEN_LEN;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/matching.toml");

/// A weight per classification level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelWeights {
    pub primary: f64,
    pub secondary: f64,
    pub tertiary: f64,
}

impl LevelWeights {
    pub fn get(&self, level: MatchLevel) -> f64 {
        match level {
            MatchLevel::Primary => self.primary,
            MatchLevel::Secondary => self.secondary,
            MatchLevel::Tertiary => self.tertiary,
        }
    }

    fn max(&self) -> f64 {
        self.primary.max(self.secondary).max(self.tertiary)
    }
}

/// Tunables for the matching pipeline and suggestion ranker
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    /// Confidence of an exact-phrase hit per level, and the word-stage multiplier
    pub level_weights: LevelWeights,
    /// Word-overlap confidence needed to accept a result (inclusive)
    pub word_accept_threshold: f64,
    /// Fuzzy candidates below this are dropped from acceptance
    pub fuzzy_candidate_floor: f64,
    /// Fuzzy confidence a result must exceed to be accepted
    pub fuzzy_accept_threshold: f64,
    /// Relative weight of each field in the fuzzy stage
    pub fuzzy_field_weights: LevelWeights,
    /// Options returned per level by the suggestion ranker
    pub suggestion_limit: usize,
    pub suggestion_fuzzy_floor: f64,
    pub suggestion_word_floor: f64,
    /// Minimum token length
    pub min_token_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            level_weights: LevelWeights {
                primary: 1.0,
                secondary: 0.9,
                tertiary: 0.8,
            },
            word_accept_threshold: 0.4,
            fuzzy_candidate_floor: 0.3,
            fuzzy_accept_threshold: 0.4,
            fuzzy_field_weights: LevelWeights {
                primary: 1.0,
                secondary: 1.0,
                tertiary: 1.0,
            },
            suggestion_limit: 5,
            suggestion_fuzzy_floor: 0.3,
            suggestion_word_floor: 0.4,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
        }
    }
}

impl MatcherConfig {
    /// Load the user override if present, else the embedded default
    pub fn load() -> Result<Self> {
        let content = resolve_text(None, "matching.toml", DEFAULT_CONFIG)?;
        parse_config(&content)
    }

    /// Load from an explicit file, which must exist
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = resolve_text(Some(path), "matching.toml", DEFAULT_CONFIG)?;
        parse_config(&content)
    }

    /// Parse TOML content on top of the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Fuzzy field weights scaled so the heaviest field is 1.0
    pub fn normalized_fuzzy_weights(&self) -> LevelWeights {
        let max = self.fuzzy_field_weights.max();
        LevelWeights {
            primary: self.fuzzy_field_weights.primary / max,
            secondary: self.fuzzy_field_weights.secondary / max,
            tertiary: self.fuzzy_field_weights.tertiary / max,
        }
    }

    /// Reject values that would make scores leave [0, 1]
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("thresholds.word_accept", self.word_accept_threshold),
            ("thresholds.fuzzy_floor", self.fuzzy_candidate_floor),
            ("thresholds.fuzzy_accept", self.fuzzy_accept_threshold),
            ("suggestions.fuzzy_floor", self.suggestion_fuzzy_floor),
            ("suggestions.word_floor", self.suggestion_word_floor),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        for level in MatchLevel::all() {
            let weight = self.level_weights.get(*level);
            if !(weight > 0.0 && weight <= 1.0) {
                return Err(Error::Config(format!(
                    "levels.{} must be in (0, 1], got {}",
                    level.as_str(),
                    weight
                )));
            }
            let field_weight = self.fuzzy_field_weights.get(*level);
            if !(field_weight > 0.0 && field_weight.is_finite()) {
                return Err(Error::Config(format!(
                    "fuzzy.weights.{} must be positive, got {}",
                    level.as_str(),
                    field_weight
                )));
            }
        }

        if self.suggestion_limit == 0 {
            return Err(Error::Config("suggestions.limit must be at least 1".into()));
        }
        if self.min_token_len == 0 {
            return Err(Error::Config("tokens.min_length must be at least 1".into()));
        }

        Ok(())
    }
}

/// Directory holding user config overrides
pub fn config_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("coa").join("config"))
}

/// Resolve config text: explicit path (must exist), else user override in
/// [`config_dir`], else the embedded default.
pub(crate) fn resolve_text(
    explicit: Option<&Path>,
    file_name: &str,
    embedded: &str,
) -> Result<String> {
    if let Some(path) = explicit {
        debug!("Reading config from {}", path.display());
        return fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        });
    }

    if let Some(path) = config_dir().map(|d| d.join(file_name)) {
        if path.exists() {
            debug!("Reading config override from {}", path.display());
            return fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            });
        }
    }

    Ok(embedded.to_string())
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    levels: Option<RawWeights>,
    thresholds: Option<RawThresholds>,
    fuzzy: Option<RawFuzzy>,
    suggestions: Option<RawSuggestions>,
    tokens: Option<RawTokens>,
}

#[derive(Debug, Deserialize)]
struct RawWeights {
    primary: Option<f64>,
    secondary: Option<f64>,
    tertiary: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawThresholds {
    word_accept: Option<f64>,
    fuzzy_floor: Option<f64>,
    fuzzy_accept: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFuzzy {
    weights: Option<RawWeights>,
}

#[derive(Debug, Deserialize)]
struct RawSuggestions {
    limit: Option<usize>,
    fuzzy_floor: Option<f64>,
    word_floor: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTokens {
    min_length: Option<usize>,
}

fn apply_weights(target: &mut LevelWeights, raw: RawWeights) {
    if let Some(v) = raw.primary {
        target.primary = v;
    }
    if let Some(v) = raw.secondary {
        target.secondary = v;
    }
    if let Some(v) = raw.tertiary {
        target.tertiary = v;
    }
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<MatcherConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = MatcherConfig::default();

    if let Some(levels) = raw.levels {
        apply_weights(&mut config.level_weights, levels);
    }

    if let Some(thresholds) = raw.thresholds {
        if let Some(v) = thresholds.word_accept {
            config.word_accept_threshold = v;
        }
        if let Some(v) = thresholds.fuzzy_floor {
            config.fuzzy_candidate_floor = v;
        }
        if let Some(v) = thresholds.fuzzy_accept {
            config.fuzzy_accept_threshold = v;
        }
    }

    if let Some(weights) = raw.fuzzy.and_then(|f| f.weights) {
        apply_weights(&mut config.fuzzy_field_weights, weights);
    }

    if let Some(suggestions) = raw.suggestions {
        if let Some(v) = suggestions.limit {
            config.suggestion_limit = v;
        }
        if let Some(v) = suggestions.fuzzy_floor {
            config.suggestion_fuzzy_floor = v;
        }
        if let Some(v) = suggestions.word_floor {
            config.suggestion_word_floor = v;
        }
    }

    if let Some(v) = raw.tokens.and_then(|t| t.min_length) {
        config.min_token_len = v;
    }

    config.validate()?;
    Ok(config)
}
