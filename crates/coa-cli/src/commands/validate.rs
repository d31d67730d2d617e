//! Classification path validation command

use anyhow::Result;
use coa_core::{HierarchyPath, Matcher};

/// Print validation errors; fails when the path is not legal so the
/// process exits non-zero
pub fn cmd_validate(matcher: &Matcher, path: &HierarchyPath) -> Result<()> {
    let result = matcher.validate(path);

    if result.is_valid {
        println!("✅ Valid: {}", path.display());
        return Ok(());
    }

    println!("❌ Invalid: {}", path.display());
    for error in &result.errors {
        println!("   • {}", error.message);
    }

    anyhow::bail!(
        "Classification has {} error{}",
        result.errors.len(),
        if result.errors.len() == 1 { "" } else { "s" }
    )
}
