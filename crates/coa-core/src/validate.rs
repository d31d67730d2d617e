//! Validation of a user-chosen classification path
//!
//! Every level is checked even when an ancestor failed. An unset ancestor
//! makes the taxonomy query for its children empty, so the child is then
//! reported invalid as well.

use crate::models::{
    is_set, HierarchyLevel, HierarchyPath, ValidationError, ValidationErrorKind, ValidationResult,
};
use crate::taxonomy::TaxonomyIndex;

pub fn validate_path(taxonomy: &TaxonomyIndex, path: &HierarchyPath) -> ValidationResult {
    let mut errors = Vec::new();

    for level in HierarchyLevel::all() {
        let value = path.get(*level);
        if !is_set(value) {
            errors.push(ValidationError {
                level: *level,
                kind: ValidationErrorKind::Missing,
                message: format!("Please select the {}", level.label()),
            });
            continue;
        }

        if !is_legal(taxonomy, path, *level, value) {
            errors.push(ValidationError {
                level: *level,
                kind: ValidationErrorKind::Invalid,
                message: format!("Invalid {} selection: {}", level.label(), value),
            });
        }
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn is_legal(taxonomy: &TaxonomyIndex, path: &HierarchyPath, level: HierarchyLevel, value: &str) -> bool {
    match level {
        HierarchyLevel::AccountType => taxonomy.account_type_name(value).is_some(),
        HierarchyLevel::Primary => taxonomy
            .primary_options(&path.account_type)
            .iter()
            .any(|p| p == value),
        HierarchyLevel::Secondary => taxonomy
            .secondary_options(&path.account_type, &path.primary)
            .iter()
            .any(|s| s == value),
        HierarchyLevel::Tertiary => taxonomy
            .tertiary_options(&path.account_type, &path.primary, &path.secondary)
            .iter()
            .any(|t| t == value),
    }
}
