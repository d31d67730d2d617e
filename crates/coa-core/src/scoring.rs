//! Confidence scoring
//!
//! Override hits are scored by how much of the hierarchy they resolve.
//! Search hits carry their own similarity-based confidence and never pass
//! through here.

use crate::models::{is_set, HierarchyPath};

// Weights in tenths so the sum is exact: 1 + 3 + 3 + 3 = 10
const ACCOUNT_TYPE_TENTHS: u32 = 1;
const PRIMARY_TENTHS: u32 = 3;
const SECONDARY_TENTHS: u32 = 3;
const TERTIARY_TENTHS: u32 = 3;

/// Weighted confidence of a resolved hierarchy: 0.1 for the account type,
/// 0.3 each for primary, secondary and tertiary. Capped at 1.0.
pub fn hierarchy_confidence(path: &HierarchyPath) -> f64 {
    let mut tenths = 0;
    if is_set(&path.account_type) {
        tenths += ACCOUNT_TYPE_TENTHS;
    }
    if is_set(&path.primary) {
        tenths += PRIMARY_TENTHS;
    }
    if is_set(&path.secondary) {
        tenths += SECONDARY_TENTHS;
    }
    if is_set(&path.tertiary) {
        tenths += TERTIARY_TENTHS;
    }
    (f64::from(tenths) / 10.0).min(1.0)
}

/// Clamp a score into [0, 1]; NaN becomes 0
pub fn clamp_confidence(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}
