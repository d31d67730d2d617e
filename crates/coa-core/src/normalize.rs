//! Text normalization and word-level comparison
//!
//! The normalized form of an entry name is the lookup key for the override
//! tables and the basis for every search stage.

use std::sync::OnceLock;

use regex::Regex;

/// Default minimum token length (tokens must be longer than two characters)
pub const DEFAULT_MIN_TOKEN_LEN: usize = 3;

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"))
}

/// Lower-case, replace non-alphanumerics with spaces, collapse whitespace
///
/// ```
/// use coa_core::normalize::normalize_text;
/// assert_eq!(normalize_text("  OCBC 601333628201 - USD "), "ocbc 601333628201 usd");
/// ```
pub fn normalize_text(text: &str) -> String {
    let lower = text.to_lowercase();
    non_alphanumeric()
        .replace_all(&lower, " ")
        .trim()
        .to_string()
}

/// Split normalized text into tokens of at least `min_len` characters
pub fn tokenize(normalized: &str, min_len: usize) -> Vec<String> {
    normalized
        .split(' ')
        .filter(|t| t.chars().count() >= min_len)
        .map(str::to_string)
        .collect()
}

/// Normalize then tokenize
pub fn normalized_tokens(text: &str, min_len: usize) -> Vec<String> {
    tokenize(&normalize_text(text), min_len)
}

/// Whole-word containment test over normalized text.
///
/// Both sides are expected to be normalized (single spaces, alphanumerics
/// only), so word boundaries are exactly the spaces and the ends.
pub fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack
        .match_indices(needle)
        .any(|(start, _)| {
            let end = start + needle.len();
            let before_ok = start == 0 || haystack.as_bytes()[start - 1] == b' ';
            let after_ok = end == haystack.len() || haystack.as_bytes()[end] == b' ';
            before_ok && after_ok
        })
}

/// Bidirectional whole-word test between two tokens or phrases
pub fn words_match(a: &str, b: &str) -> bool {
    contains_whole_word(a, b) || contains_whole_word(b, a)
}
