//! Exact-phrase and word-overlap search over the taxonomy
//!
//! Both searches are scoped to one account type. Taxonomy fields are
//! normalized and tokenized once when the corpus is built.

use crate::config::LevelWeights;
use crate::models::{CandidateMatch, MatchLevel, MatchType, TaxonomyEntry};
use crate::normalize::{contains_whole_word, normalize_text, tokenize, words_match};
use crate::taxonomy::TaxonomyIndex;

/// Normalized entry text and its tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw: String,
    pub normalized: String,
    pub tokens: Vec<String>,
}

impl Query {
    pub fn new(text: &str, min_token_len: usize) -> Self {
        let normalized = normalize_text(text);
        let tokens = tokenize(&normalized, min_token_len);
        Self {
            raw: text.to_string(),
            normalized,
            tokens,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// A taxonomy field prepared for comparison
#[derive(Debug, Clone)]
pub struct PreparedField {
    pub normalized: String,
    pub tokens: Vec<String>,
}

impl PreparedField {
    fn new(value: &str, min_token_len: usize) -> Self {
        let normalized = normalize_text(value);
        let tokens = tokenize(&normalized, min_token_len);
        Self { normalized, tokens }
    }
}

/// A taxonomy entry with its three classification fields prepared
#[derive(Debug, Clone)]
pub struct PreparedEntry {
    pub entry: TaxonomyEntry,
    account_key: String,
    fields: [PreparedField; 3],
}

impl PreparedEntry {
    pub fn field(&self, level: MatchLevel) -> &PreparedField {
        match level {
            MatchLevel::Primary => &self.fields[0],
            MatchLevel::Secondary => &self.fields[1],
            MatchLevel::Tertiary => &self.fields[2],
        }
    }
}

/// Prepared view of every taxonomy entry, in taxonomy order
#[derive(Debug, Clone, Default)]
pub struct SearchCorpus {
    entries: Vec<PreparedEntry>,
}

impl SearchCorpus {
    pub fn new(taxonomy: &TaxonomyIndex, min_token_len: usize) -> Self {
        let entries = taxonomy
            .entries()
            .iter()
            .map(|entry| PreparedEntry {
                account_key: entry.account_type.to_lowercase(),
                fields: [
                    PreparedField::new(&entry.primary, min_token_len),
                    PreparedField::new(&entry.secondary, min_token_len),
                    PreparedField::new(&entry.tertiary, min_token_len),
                ],
                entry: entry.clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn all(&self) -> &[PreparedEntry] {
        &self.entries
    }

    /// Entries under one account type, ignoring case
    pub fn scoped(&self, account_type: &str) -> impl Iterator<Item = &PreparedEntry> + '_ {
        let wanted = account_type.to_lowercase();
        self.entries
            .iter()
            .filter(move |e| e.account_key == wanted)
    }
}

/// Sort candidates best first; ties keep taxonomy order
pub fn rank(candidates: &mut [CandidateMatch]) {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

/// Whole-phrase search: the entire normalized query must appear as whole
/// words inside a field. Fields are tried primary, secondary, tertiary and
/// the first hit scores that level's weight.
pub fn exact_search(
    corpus: &SearchCorpus,
    query: &Query,
    account_type: &str,
    weights: &LevelWeights,
) -> Vec<CandidateMatch> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<CandidateMatch> = corpus
        .scoped(account_type)
        .filter_map(|prepared| {
            MatchLevel::all()
                .iter()
                .find(|level| {
                    contains_whole_word(&prepared.field(**level).normalized, &query.normalized)
                })
                .map(|level| {
                    CandidateMatch::new(
                        &prepared.entry,
                        weights.get(*level),
                        MatchType::Exact,
                        *level,
                    )
                })
        })
        .collect();

    rank(&mut candidates);
    candidates
}

/// Token-overlap search.
///
/// For each level, counts query tokens that whole-word match a field token.
/// Confidence is `matched / max(query tokens, field tokens) * weight`; the
/// entry keeps its best level. Entries with no overlap are not candidates.
pub fn word_search(
    corpus: &SearchCorpus,
    query: &Query,
    account_type: &str,
    weights: &LevelWeights,
) -> Vec<CandidateMatch> {
    if query.tokens.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<CandidateMatch> = corpus
        .scoped(account_type)
        .filter_map(|prepared| best_word_level(prepared, query, weights))
        .collect();

    rank(&mut candidates);
    candidates
}

fn best_word_level(
    prepared: &PreparedEntry,
    query: &Query,
    weights: &LevelWeights,
) -> Option<CandidateMatch> {
    let mut best: Option<(f64, MatchLevel, Vec<String>)> = None;

    for level in MatchLevel::all() {
        let field = prepared.field(*level);
        if field.tokens.is_empty() {
            continue;
        }

        let matched: Vec<String> = query
            .tokens
            .iter()
            .filter(|qt| field.tokens.iter().any(|ft| words_match(qt, ft)))
            .cloned()
            .collect();
        if matched.is_empty() {
            continue;
        }

        let denominator = query.tokens.len().max(field.tokens.len()) as f64;
        let confidence = matched.len() as f64 / denominator * weights.get(*level);

        if best.as_ref().map_or(true, |(c, _, _)| confidence > *c) {
            best = Some((confidence, *level, matched));
        }
    }

    best.map(|(confidence, level, matched)| {
        CandidateMatch::new(&prepared.entry, confidence, MatchType::Word, level)
            .with_matched_words(matched)
    })
}
