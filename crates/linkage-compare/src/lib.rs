//! Building blocks for record-linkage comparisons: level constructors, a
//! comparison builder, a template catalog, blocking rules, descriptions,
//! and local pair evaluation.

pub mod blocking;
pub mod comparison;
pub mod describe;
pub mod evaluate;
pub mod level;
pub mod templates;

pub use blocking::{BlockingRule, block_on};
pub use comparison::ComparisonBuilder;
pub use describe::{human_readable_description, settings_description};
pub use evaluate::{LevelOutcome, LevelStatus, PairEvaluation, evaluate_pair};
pub use level::{
    LevelBuilder, absolute_difference_level, columns_reversed_level, custom_level,
    damerau_levenshtein_level, else_level, exact_match_level, jaccard_level, jaro_level,
    jaro_winkler_level, levenshtein_level, null_level, percentage_difference_level,
};
pub use templates::{
    TemplateKind, damerau_levenshtein_at_thresholds, email_comparison, exact_match,
    jaro_winkler_at_thresholds, levenshtein_at_thresholds, postcode_comparison,
};
