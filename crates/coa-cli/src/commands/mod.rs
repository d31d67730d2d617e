//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared setup (taxonomy loading, matcher construction)
//! - `classify` - Ledger classification and export
//! - `inspect` - Single-entry match, suggestions, taxonomy browsing
//! - `validate` - Classification path validation

pub mod classify;
pub mod core;
pub mod inspect;
pub mod validate;

// Re-export command functions for main.rs
pub use classify::*;
pub use core::*;
pub use inspect::*;
pub use validate::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
