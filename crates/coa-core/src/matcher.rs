//! Classification matching pipeline
//!
//! Strategies run in order and the first success wins:
//! predefined override → historical override → exact phrase → word overlap
//! → fuzzy → no match.
//!
//! The matcher owns its taxonomy, override tables and match log. The match
//! log gets one entry per `find_best_match` call and is cleared only when
//! the caller asks.

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::{LevelWeights, MatcherConfig};
use crate::fuzzy::fuzzy_search;
use crate::models::{
    CandidateMatch, Classification, ClassifiedRow, HierarchyPath, LedgerRow, MatchLogEntry,
    MatchSource, MatchStage, MatchType, Suggestions, ValidationResult,
};
use crate::overrides::{OverrideEntry, OverrideStore};
use crate::scoring::hierarchy_confidence;
use crate::search::{exact_search, rank, word_search, Query, SearchCorpus};
use crate::suggest::rank_suggestions;
use crate::taxonomy::TaxonomyIndex;
use crate::validate::validate_path;

/// Outcome of one pipeline run before it is logged
struct PipelineOutcome {
    classification: Classification,
    stage: MatchStage,
    /// What the deciding stage considered, for the log
    considered: Vec<CandidateMatch>,
}

/// Classification engine
pub struct Matcher {
    taxonomy: TaxonomyIndex,
    corpus: SearchCorpus,
    overrides: OverrideStore,
    config: MatcherConfig,
    fuzzy_weights: LevelWeights,
    log: Vec<MatchLogEntry>,
}

impl Matcher {
    pub fn new(taxonomy: TaxonomyIndex, overrides: OverrideStore, config: MatcherConfig) -> Self {
        let corpus = SearchCorpus::new(&taxonomy, config.min_token_len);
        let fuzzy_weights = config.normalized_fuzzy_weights();
        Self {
            taxonomy,
            corpus,
            overrides,
            config,
            fuzzy_weights,
            log: Vec::new(),
        }
    }

    /// Matcher with default config and no curated overrides
    pub fn with_taxonomy(taxonomy: TaxonomyIndex) -> Self {
        Self::new(taxonomy, OverrideStore::empty(), MatcherConfig::default())
    }

    pub fn taxonomy(&self) -> &TaxonomyIndex {
        &self.taxonomy
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Classify one entry name. Always returns a result; a miss is the
    /// explicit "no match" classification with confidence 0.
    pub fn find_best_match(&mut self, entry_text: &str, account_type_hint: &str) -> Classification {
        let query = Query::new(entry_text, self.config.min_token_len);
        let outcome = self.run_pipeline(&query, account_type_hint);

        debug!(
            "Matched '{}' via {} (confidence: {:.3})",
            entry_text,
            outcome.stage.as_str(),
            outcome.classification.confidence
        );

        let classification = outcome.classification;
        self.log.push(MatchLogEntry {
            timestamp: Utc::now(),
            input: query.raw,
            account_type_hint: account_type_hint.to_string(),
            normalized: query.normalized,
            tokens: query.tokens,
            stage: outcome.stage,
            candidates: outcome.considered,
            result: classification
                .is_match()
                .then(|| classification.path().display()),
            confidence: classification.confidence,
        });

        classification
    }

    /// Classify a batch of ledger rows in order
    pub fn classify_rows(&mut self, rows: &[LedgerRow]) -> Vec<ClassifiedRow> {
        rows.iter()
            .map(|row| ClassifiedRow {
                classification: self.find_best_match(&row.entry_name, &row.account_type_hint),
                row: row.clone(),
            })
            .collect()
    }

    /// Remember a user-confirmed classification for this matcher's lifetime.
    ///
    /// Returns false, storing nothing, if the path is not a complete taxonomy
    /// path or the entry name normalizes to nothing.
    pub fn add_historical_match(&mut self, entry_text: &str, path: &HierarchyPath) -> bool {
        let check = self.validate(path);
        if !check.is_valid {
            warn!(
                "Rejecting historical match for '{}': {} ({} error(s))",
                entry_text,
                path.display(),
                check.errors.len()
            );
            return false;
        }
        self.overrides
            .add_historical(entry_text, OverrideEntry::from_path(path))
    }

    /// Every match attempt since construction or the last clear
    pub fn match_log(&self) -> &[MatchLogEntry] {
        &self.log
    }

    pub fn clear_match_log(&mut self) {
        self.log.clear();
    }

    /// Ranked options per level for interactive correction
    pub fn suggestions(&self, text: &str, account_type_hint: &str) -> Suggestions {
        let query = Query::new(text, self.config.min_token_len);
        rank_suggestions(
            &self.taxonomy,
            &self.corpus,
            &query,
            account_type_hint,
            &self.config,
            &self.fuzzy_weights,
        )
    }

    /// Check a chosen path against the taxonomy
    pub fn validate(&self, path: &HierarchyPath) -> ValidationResult {
        validate_path(&self.taxonomy, path)
    }

    fn run_pipeline(&self, query: &Query, hint: &str) -> PipelineOutcome {
        if let Some(outcome) = self.match_override(query, hint) {
            return outcome;
        }

        let weights = &self.config.level_weights;

        // Exact phrase / word boundary
        let exact = exact_search(&self.corpus, query, hint, weights);
        if let Some(top) = exact.first() {
            debug!("Exact match for '{}': {}", query.normalized, top.display_path);
            return PipelineOutcome {
                classification: Classification::from_candidate(top, exact.clone()),
                stage: MatchStage::Exact,
                considered: exact,
            };
        }

        // Word overlap
        let words = word_search(&self.corpus, query, hint, weights);
        if let Some(top) = words.first() {
            if top.confidence >= self.config.word_accept_threshold {
                debug!(
                    "Word match for '{}': {} ({:?})",
                    query.normalized, top.display_path, top.matched_words
                );
                return PipelineOutcome {
                    classification: Classification::from_candidate(top, words.clone()),
                    stage: MatchStage::Word,
                    considered: words,
                };
            }
            debug!(
                "Best word match for '{}' below threshold ({:.3})",
                query.normalized, top.confidence
            );
        }

        // Fuzzy, across all account types
        let fuzzy = fuzzy_search(&self.corpus, query, &self.fuzzy_weights);
        let accepted: Vec<CandidateMatch> = fuzzy
            .iter()
            .filter(|c| c.confidence >= self.config.fuzzy_candidate_floor)
            .cloned()
            .collect();
        // The log keeps the below-threshold word candidates whichever way
        // this ends
        let mut considered = words.clone();
        considered.extend(fuzzy);
        rank(&mut considered);

        if let Some(top) = accepted.first() {
            if top.confidence > self.config.fuzzy_accept_threshold {
                debug!(
                    "Fuzzy match for '{}': {} ({:.3})",
                    query.normalized, top.display_path, top.confidence
                );
                return PipelineOutcome {
                    classification: Classification::from_candidate(top, accepted.clone()),
                    stage: MatchStage::Fuzzy,
                    considered,
                };
            }
        }

        // Nothing good enough: keep what was collected for review
        let mut possible = words;
        possible.extend(accepted);
        rank(&mut possible);

        debug!("No match for '{}'", query.normalized);
        PipelineOutcome {
            classification: Classification::no_match(hint, possible),
            stage: MatchStage::NoMatch,
            considered,
        }
    }

    fn match_override(&self, query: &Query, hint: &str) -> Option<PipelineOutcome> {
        if query.is_empty() {
            return None;
        }

        let (entry, source, stage) = if let Some(entry) = self.overrides.predefined(&query.normalized)
        {
            (entry, MatchSource::Predefined, MatchStage::Predefined)
        } else if let Some(entry) = self.overrides.historical(&query.normalized) {
            (entry, MatchSource::Historical, MatchStage::Historical)
        } else {
            return None;
        };

        let mut path = entry.resolve(hint);
        match self.taxonomy.owning_account_type(&path) {
            Some(owner) => path.account_type = owner.to_string(),
            None => warn!(
                "{} override for '{}' is not in the taxonomy: {}",
                source,
                query.normalized,
                path.display()
            ),
        }
        let confidence = hierarchy_confidence(&path);
        debug!(
            "{} override for '{}': {}",
            source,
            query.normalized,
            path.display()
        );

        Some(PipelineOutcome {
            classification: Classification::from_override(&path, confidence, source),
            stage,
            considered: Vec::new(),
        })
    }
}

/// Counts of how a batch was classified
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub total: usize,
    pub by_predefined: usize,
    pub by_historical: usize,
    pub by_exact: usize,
    pub by_word: usize,
    pub by_fuzzy: usize,
    pub unmatched: usize,
}

impl ClassificationSummary {
    pub fn from_rows(rows: &[ClassifiedRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            let c = &row.classification;
            summary.total += 1;
            match (c.match_type, c.match_source) {
                (_, MatchSource::Predefined) => summary.by_predefined += 1,
                (_, MatchSource::Historical) => summary.by_historical += 1,
                (MatchType::Exact, _) => summary.by_exact += 1,
                (MatchType::Word, _) => summary.by_word += 1,
                (MatchType::Fuzzy, _) => summary.by_fuzzy += 1,
                (MatchType::None, _) => summary.unmatched += 1,
            }
        }
        summary
    }

    pub fn matched(&self) -> usize {
        self.total - self.unmatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchLevel, TaxonomyEntry, UNKNOWN};

    fn taxonomy() -> TaxonomyIndex {
        TaxonomyIndex::from_entries(vec![
            TaxonomyEntry::new(
                "Asset",
                "Cash and Cash Equivalents (CAS)",
                "Cash Balances",
                "Cash In Hand",
            ),
            TaxonomyEntry::new(
                "Asset",
                "Cash and Cash Equivalents (CAS)",
                "Cash Balances",
                "Cash At Bank",
            ),
            TaxonomyEntry::new(
                "Expense",
                "Operating Expenses (OPEX)",
                "Staff Costs",
                "Staff Welfare",
            ),
            TaxonomyEntry::new(
                "Expense",
                "Operating Expenses (OPEX)",
                "Administrative Expenses",
                "Printing and Stationery",
            ),
            TaxonomyEntry::new("Expense", "Cost of Sales (COGS)", "Direct Costs", "Purchases"),
        ])
    }

    fn cash_in_hand(account_type: &str) -> OverrideEntry {
        OverrideEntry::new(
            Some(account_type.to_string()),
            "Cash and Cash Equivalents (CAS)",
            "Cash Balances",
            "Cash In Hand",
        )
    }

    fn matcher_with_predefined() -> Matcher {
        let overrides = OverrideStore::new(vec![("OCBC 601333628201 - USD", cash_in_hand("Asset"))]);
        Matcher::new(taxonomy(), overrides, MatcherConfig::default())
    }

    #[test]
    fn test_predefined_override() {
        let mut matcher = matcher_with_predefined();
        let result = matcher.find_best_match("ocbc 601333628201 usd", "Asset");

        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.match_source, MatchSource::Predefined);
        assert_eq!(result.tertiary, "Cash In Hand");
        assert_eq!(result.confidence, 1.0);
        assert!(result.possible_matches.is_empty());
    }

    #[test]
    fn test_override_account_type_follows_taxonomy() {
        // Curated under a parent category the taxonomy does not use
        let overrides = OverrideStore::new(vec![(
            "OCBC 601333628201 - USD",
            cash_in_hand("Current Asset"),
        )]);
        let mut matcher = Matcher::new(taxonomy(), overrides, MatcherConfig::default());

        let result = matcher.find_best_match("OCBC 601333628201 - USD", "Asset");
        assert_eq!(result.match_source, MatchSource::Predefined);
        assert_eq!(result.account_type, "Asset");
        assert!(matcher.taxonomy().contains(&result.path()));
        assert_eq!(result.confidence, 1.0);

        // Hint spelling is canonicalized too
        let stamps = OverrideStore::new(vec![(
            "Stamps",
            OverrideEntry::new(None, "Operating Expenses (OPEX)", UNKNOWN, UNKNOWN),
        )]);
        let mut matcher = Matcher::new(taxonomy(), stamps, MatcherConfig::default());
        assert_eq!(matcher.find_best_match("Stamps", "EXPENSE").account_type, "Expense");
    }

    #[test]
    fn test_historical_override() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        let path = HierarchyPath::new(
            "Expense",
            "Operating Expenses (OPEX)",
            "Staff Costs",
            "Staff Welfare",
        );
        assert!(matcher.add_historical_match("Team Lunch", &path));

        let result = matcher.find_best_match("TEAM LUNCH", "Expense");
        assert_eq!(result.match_source, MatchSource::Historical);
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.path(), path);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_historical_rejects_paths_outside_taxonomy() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        let orphan = HierarchyPath::new(
            "Current Asset",
            "Cash and Cash Equivalents (CAS)",
            "Cash Balances",
            "Cash In Hand",
        );
        let partial = HierarchyPath::new("Expense", "Operating Expenses (OPEX)", UNKNOWN, UNKNOWN);

        assert!(!matcher.add_historical_match("Float", &orphan));
        assert!(!matcher.add_historical_match("Team Lunch", &partial));
        assert_eq!(matcher.overrides().historical_len(), 0);
        assert_ne!(
            matcher.find_best_match("Float", "Asset").match_source,
            MatchSource::Historical
        );
    }

    #[test]
    fn test_predefined_beats_historical() {
        let mut matcher = matcher_with_predefined();
        let other = HierarchyPath::new(
            "Expense",
            "Cost of Sales (COGS)",
            "Direct Costs",
            "Purchases",
        );
        assert!(matcher.add_historical_match("OCBC 601333628201 - USD", &other));

        let result = matcher.find_best_match("OCBC 601333628201 - USD", "Asset");
        assert_eq!(result.match_source, MatchSource::Predefined);
        assert_eq!(result.tertiary, "Cash In Hand");
    }

    #[test]
    fn test_override_without_account_type_uses_hint() {
        let overrides = OverrideStore::new(vec![(
            "Stamps",
            OverrideEntry::new(None, "Operating Expenses (OPEX)", UNKNOWN, UNKNOWN),
        )]);
        let mut matcher = Matcher::new(taxonomy(), overrides, MatcherConfig::default());

        let result = matcher.find_best_match("Stamps", "Expense");
        assert_eq!(result.account_type, "Expense");
        assert_eq!(result.secondary, UNKNOWN);
        assert_eq!(result.confidence, 0.4);
    }

    #[test]
    fn test_exact_stage() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        let result = matcher.find_best_match("Cash At Bank", "asset");

        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.match_source, MatchSource::Tertiary);
        assert_eq!(result.account_type, "Asset");
        assert_eq!(result.tertiary, "Cash At Bank");
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.possible_matches.len(), 1);
    }

    #[test]
    fn test_word_stage() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        let result = matcher.find_best_match("Staff Welfare Expenses", "Expense");

        assert_eq!(result.match_type, MatchType::Word);
        assert_eq!(result.match_source, MatchSource::Tertiary);
        assert_eq!(result.tertiary, "Staff Welfare");
        assert!((result.confidence - 2.0 / 3.0 * 0.8).abs() < 1e-12);
        assert!(!result.possible_matches.is_empty());
    }

    #[test]
    fn test_fuzzy_stage() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        // Misspelled and filed under an account type with no such entry
        let result = matcher.find_best_match("Printng Stationary", "Asset");

        assert_eq!(result.match_type, MatchType::Fuzzy);
        assert_eq!(result.account_type, "Expense");
        assert_eq!(result.tertiary, "Printing and Stationery");
        assert!(result.confidence > 0.4 && result.confidence <= 1.0);
        assert!(result
            .possible_matches
            .iter()
            .all(|c| c.confidence >= 0.3));
    }

    #[test]
    fn test_no_match() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        let result = matcher.find_best_match("zzzz qqqq", "Equity");

        assert_eq!(result.account_type, "Equity");
        assert_eq!(result.primary, UNKNOWN);
        assert_eq!(result.secondary, UNKNOWN);
        assert_eq!(result.tertiary, UNKNOWN);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.match_type, MatchType::None);
        assert_eq!(result.match_source, MatchSource::Unmatched);
        assert!(result.possible_matches.is_empty());
    }

    #[test]
    fn test_empty_text_is_no_match() {
        let mut matcher = matcher_with_predefined();
        let result = matcher.find_best_match("  --  ", "Asset");
        assert_eq!(result.match_type, MatchType::None);
        assert_eq!(matcher.match_log().len(), 1);
    }

    #[test]
    fn test_below_threshold_word_candidates_kept() {
        let config = MatcherConfig {
            word_accept_threshold: 0.9,
            fuzzy_accept_threshold: 0.99,
            ..MatcherConfig::default()
        };
        let mut matcher = Matcher::new(taxonomy(), OverrideStore::empty(), config);
        let result = matcher.find_best_match("Staff Welfare Expenses", "Expense");

        assert_eq!(result.match_type, MatchType::None);
        assert!(result
            .possible_matches
            .iter()
            .any(|c| c.match_type == MatchType::Word));
        assert_eq!(matcher.match_log()[0].stage, MatchStage::NoMatch);
    }

    #[test]
    fn test_deterministic() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        let first = matcher.find_best_match("Staff Expenses", "Expense");
        let second = matcher.find_best_match("Staff Expenses", "Expense");
        assert_eq!(first, second);
        assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
    }

    #[test]
    fn test_match_log_lifecycle() {
        let mut matcher = matcher_with_predefined();
        matcher.find_best_match("OCBC 601333628201 - USD", "Asset");
        matcher.find_best_match("Staff Welfare Expenses", "Expense");

        let log = matcher.match_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].stage, MatchStage::Predefined);
        assert_eq!(log[1].input, "Staff Welfare Expenses");
        assert_eq!(log[1].normalized, "staff welfare expenses");
        assert_eq!(log[1].tokens, vec!["staff", "welfare", "expenses"]);
        assert_eq!(log[1].stage, MatchStage::Word);
        assert!(!log[1].candidates.is_empty());
        assert!(log[1].result.is_some());

        matcher.clear_match_log();
        assert!(matcher.match_log().is_empty());
    }

    #[test]
    fn test_fuzzy_log_keeps_low_candidates() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        matcher.find_best_match("Printng Stationary", "Asset");
        let entry = &matcher.match_log()[0];
        assert_eq!(entry.stage, MatchStage::Fuzzy);
        assert!(entry.candidates.iter().any(|c| c.confidence < 0.3));
    }

    #[test]
    fn test_classify_rows_and_summary() {
        let mut matcher = matcher_with_predefined();
        let rows = vec![
            LedgerRow {
                row_number: 2,
                entry_name: "OCBC 601333628201 - USD".into(),
                account_type_hint: "Asset".into(),
            },
            LedgerRow {
                row_number: 3,
                entry_name: "Purchases".into(),
                account_type_hint: "Expense".into(),
            },
            LedgerRow {
                row_number: 4,
                entry_name: "zzzz".into(),
                account_type_hint: "Expense".into(),
            },
        ];
        let classified = matcher.classify_rows(&rows);
        assert_eq!(classified.len(), 3);
        assert_eq!(classified[1].row.row_number, 3);
        assert_eq!(classified[1].classification.match_source, MatchSource::Tertiary);

        let summary = ClassificationSummary::from_rows(&classified);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_predefined, 1);
        assert_eq!(summary.by_exact, 1);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.matched(), 2);
    }

    #[test]
    fn test_search_results_stay_in_taxonomy() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        for (text, hint) in [
            ("Cash", "Asset"),
            ("staff costs", "Expense"),
            ("Printng", "Expense"),
            ("direct", "expense"),
        ] {
            let result = matcher.find_best_match(text, hint);
            if result.is_match() {
                assert!(matcher.taxonomy().contains(&result.path()), "{}", text);
            }
            for candidate in &result.possible_matches {
                assert!(matcher.taxonomy().contains(&candidate.entry.to_path()));
            }
        }
    }

    #[test]
    fn test_exact_ranks_primary_over_tertiary() {
        let mut matcher = Matcher::with_taxonomy(taxonomy());
        let result = matcher.find_best_match("Cash", "Asset");
        assert_eq!(result.match_source, MatchSource::Primary);
        assert_eq!(result.confidence, 1.0);
        assert!(result
            .possible_matches
            .iter()
            .all(|c| c.match_level == MatchLevel::Primary));
    }
}
