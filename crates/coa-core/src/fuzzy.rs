//! Approximate search across the whole taxonomy
//!
//! Each classification field is compared to the query two ways: the whole
//! normalized strings by normalized Levenshtein similarity, and per token
//! (each query token against its closest field token, averaged). The better
//! of the two is the field similarity, `1 - d` for the normalized edit
//! distance `d`. Confidence is that similarity scaled by the field weight,
//! and the best field wins.

use strsim::normalized_levenshtein;

use crate::config::LevelWeights;
use crate::models::{CandidateMatch, MatchLevel, MatchType};
use crate::scoring::clamp_confidence;
use crate::search::{rank, PreparedEntry, PreparedField, Query, SearchCorpus};

/// Score every taxonomy entry against the query, ignoring account type.
///
/// Returns entries with a non-zero confidence, best first. Callers apply
/// their own floors.
pub fn fuzzy_search(
    corpus: &SearchCorpus,
    query: &Query,
    field_weights: &LevelWeights,
) -> Vec<CandidateMatch> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<CandidateMatch> = corpus
        .all()
        .iter()
        .filter_map(|prepared| best_fuzzy_level(prepared, query, field_weights))
        .collect();

    rank(&mut candidates);
    candidates
}

fn best_fuzzy_level(
    prepared: &PreparedEntry,
    query: &Query,
    field_weights: &LevelWeights,
) -> Option<CandidateMatch> {
    let mut best: Option<(f64, MatchLevel)> = None;

    for level in MatchLevel::all() {
        let similarity = field_similarity(query, prepared.field(*level));
        let confidence = clamp_confidence(similarity * field_weights.get(*level));

        if best.map_or(true, |(c, _)| confidence > c) {
            best = Some((confidence, *level));
        }
    }

    best.filter(|(confidence, _)| *confidence > 0.0)
        .map(|(confidence, level)| {
            CandidateMatch::new(&prepared.entry, confidence, MatchType::Fuzzy, level)
        })
}

/// Similarity in [0, 1] between a query and one prepared field
fn field_similarity(query: &Query, field: &PreparedField) -> f64 {
    if field.normalized.is_empty() {
        return 0.0;
    }
    let whole = normalized_levenshtein(&query.normalized, &field.normalized);
    whole.max(token_similarity(&query.tokens, &field.tokens))
}

/// Mean over query tokens of the best similarity to any field token
fn token_similarity(query_tokens: &[String], field_tokens: &[String]) -> f64 {
    if query_tokens.is_empty() || field_tokens.is_empty() {
        return 0.0;
    }
    let total: f64 = query_tokens
        .iter()
        .map(|qt| {
            field_tokens
                .iter()
                .map(|ft| normalized_levenshtein(qt, ft))
                .fold(0.0, f64::max)
        })
        .sum();
    total / query_tokens.len() as f64
}
