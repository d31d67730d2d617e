//! Suggestion ranking for interactive correction
//!
//! Combines an unrestricted fuzzy search with a word-overlap search scoped
//! to the hinted account type, then ranks the distinct values seen at each
//! level by the best confidence any candidate gave them.

use std::collections::HashMap;

use crate::config::{LevelWeights, MatcherConfig};
use crate::fuzzy::fuzzy_search;
use crate::models::{CandidateMatch, MatchLevel, OptionItem, RankedOption, Suggestions};
use crate::search::{word_search, Query, SearchCorpus};
use crate::taxonomy::TaxonomyIndex;

pub fn rank_suggestions(
    taxonomy: &TaxonomyIndex,
    corpus: &SearchCorpus,
    query: &Query,
    account_type_hint: &str,
    config: &MatcherConfig,
    fuzzy_weights: &LevelWeights,
) -> Suggestions {
    let fuzzy = fuzzy_search(corpus, query, fuzzy_weights)
        .into_iter()
        .filter(|c| c.confidence >= config.suggestion_fuzzy_floor);
    let words = word_search(corpus, query, account_type_hint, &config.level_weights)
        .into_iter()
        .filter(|c| c.confidence >= config.suggestion_word_floor);
    let candidates: Vec<CandidateMatch> = fuzzy.chain(words).collect();

    let limit = config.suggestion_limit;
    Suggestions {
        account_type: taxonomy
            .unique_account_types()
            .into_iter()
            .map(OptionItem::new)
            .collect(),
        primary: rank_level(&candidates, MatchLevel::Primary, limit),
        secondary: rank_level(&candidates, MatchLevel::Secondary, limit),
        tertiary: rank_level(&candidates, MatchLevel::Tertiary, limit),
    }
}

/// Distinct values at one level, best confidence first, truncated to `limit`
fn rank_level(candidates: &[CandidateMatch], level: MatchLevel, limit: usize) -> Vec<RankedOption> {
    let mut best: HashMap<&str, f64> = HashMap::new();
    for candidate in candidates {
        let value = candidate.entry.level(level);
        let seen = best.entry(value).or_insert(candidate.confidence);
        if candidate.confidence > *seen {
            *seen = candidate.confidence;
        }
    }

    let mut ranked: Vec<(&str, f64)> = best.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(value, confidence)| RankedOption::new(value, confidence))
        .collect()
}
