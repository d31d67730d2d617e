//! COA Core Library
//!
//! Chart-of-accounts classification for ledger entry names:
//! - Taxonomy index over the four-level classification tree
//! - Predefined and learned (historical) overrides
//! - Exact, word-overlap and fuzzy search over the taxonomy
//! - Suggestion ranking and path validation for manual correction
//! - Ledger import and classification export

pub mod config;
pub mod error;
pub mod export;
pub mod fuzzy;
pub mod import;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod overrides;
pub mod scoring;
pub mod search;
pub mod suggest;
pub mod taxonomy;
pub mod validate;

pub use config::{LevelWeights, MatcherConfig};
pub use error::{Error, Result};
pub use export::{export_classifications, export_match_log, ExportFormat};
pub use import::{parse_corrections, parse_ledger, Correction};
pub use matcher::{ClassificationSummary, Matcher};
pub use models::{
    CandidateMatch, Classification, ClassifiedRow, HierarchyLevel, HierarchyPath, LedgerRow,
    MatchLevel, MatchLogEntry, MatchSource, MatchStage, MatchType, OptionItem, RankedOption,
    Suggestions, TaxonomyEntry, ValidationError, ValidationErrorKind, ValidationResult, UNKNOWN,
};
pub use overrides::{OverrideEntry, OverrideStore};
pub use taxonomy::TaxonomyIndex;
