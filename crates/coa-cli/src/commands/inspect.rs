//! Single-entry inspection commands: match, suggest, taxonomy

use anyhow::Result;
use coa_core::{Matcher, RankedOption, TaxonomyIndex};

use super::truncate;

/// Candidates shown under a match result
const MAX_CANDIDATES: usize = 10;

pub fn cmd_match(matcher: &mut Matcher, text: &str, account_type: &str) -> Result<()> {
    let result = matcher.find_best_match(text, account_type);

    println!();
    if result.is_match() {
        println!("✅ \"{}\"", text);
        println!("   {}", result.path().display());
        println!(
            "   {} match via {} ({:.0}% confidence)",
            result.match_type,
            result.match_source,
            result.confidence * 100.0
        );
    } else {
        println!("❓ No match for \"{}\" under {}", text, account_type);
    }

    if !result.possible_matches.is_empty() {
        println!();
        println!("🔍 Candidates:");
        println!("   ─────────────────────────────────────────────────────────────");
        for candidate in result.possible_matches.iter().take(MAX_CANDIDATES) {
            let words = candidate
                .matched_words
                .as_ref()
                .map(|w| format!(" [{}]", w.join(", ")))
                .unwrap_or_default();
            println!(
                "   {:>4.0}%  {:<6} {:<9} {}{}",
                candidate.confidence * 100.0,
                candidate.match_type.as_str(),
                candidate.match_level.as_str(),
                truncate(&candidate.display_path, 80),
                words
            );
        }
        if result.possible_matches.len() > MAX_CANDIDATES {
            println!(
                "   ... and {} more",
                result.possible_matches.len() - MAX_CANDIDATES
            );
        }
    }

    Ok(())
}

pub fn cmd_suggest(matcher: &Matcher, text: &str, account_type: &str) -> Result<()> {
    let suggestions = matcher.suggestions(text, account_type);

    println!();
    println!("💡 Suggestions for \"{}\"", text);

    let account_types: Vec<&str> = suggestions
        .account_type
        .iter()
        .map(|o| o.value.as_str())
        .collect();
    println!();
    println!("   Account type: {}", account_types.join(", "));

    print_ranked("Primary", &suggestions.primary);
    print_ranked("Secondary", &suggestions.secondary);
    print_ranked("Tertiary", &suggestions.tertiary);

    Ok(())
}

fn print_ranked(heading: &str, options: &[RankedOption]) {
    println!();
    println!("   {}:", heading);
    if options.is_empty() {
        println!("     (none)");
        return;
    }
    for option in options {
        println!("     • {}", option.label);
    }
}

pub fn cmd_taxonomy(
    taxonomy: &TaxonomyIndex,
    account_type: Option<&str>,
    primary: Option<&str>,
    secondary: Option<&str>,
) -> Result<()> {
    let (heading, options) = match (account_type, primary, secondary) {
        (Some(a), Some(p), Some(s)) => (
            format!("Tertiary classifications under {} > {} > {}", a, p, s),
            taxonomy.tertiary_options(a, p, s),
        ),
        (Some(a), Some(p), None) => (
            format!("Secondary classifications under {} > {}", a, p),
            taxonomy.secondary_options(a, p),
        ),
        (Some(a), None, _) => (
            format!("Primary classifications under {}", a),
            taxonomy.primary_options(a),
        ),
        (None, _, _) => ("Account types".to_string(), taxonomy.unique_account_types()),
    };

    if options.is_empty() {
        println!("No options found. Check the parent levels against `coa taxonomy`.");
        return Ok(());
    }

    println!();
    println!("📚 {} ({})", heading, options.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for option in &options {
        println!("   • {}", option);
    }

    Ok(())
}
