//! Human-readable descriptions of comparisons and whole settings objects.

use linkage_model::{Comparison, Settings};

/// Describe one comparison: its name and every level with its SQL rule.
pub fn human_readable_description(comparison: &Comparison) -> String {
    let mut text = format!(
        "Comparison '{}' of \"{}\".\n",
        comparison.display_name(),
        comparison.output_column_name
    );
    text.push_str("Similarity is assessed using the following comparison levels:\n");
    for level in &comparison.comparison_levels {
        text.push_str(&format!(
            "    - '{}' with SQL rule: {}\n",
            level.label_for_charts, level.sql_condition
        ));
    }
    text
}

/// Describe a whole settings object: link type, dialect, unique-id column,
/// every comparison, and the blocking rules.
pub fn settings_description(settings: &Settings) -> String {
    let mut text = format!(
        "Linkage settings for a {} job on the {} dialect.\n",
        settings.link_type, settings.sql_dialect
    );
    text.push_str(&format!(
        "Records are identified by the '{}' column.\n",
        settings.unique_id_column_name
    ));

    if settings.comparisons.is_empty() {
        text.push_str("No comparisons are configured.\n");
    } else {
        text.push_str("Similarity is measured using the following comparisons:\n");
        for comparison in &settings.comparisons {
            text.push('\n');
            text.push_str(&human_readable_description(comparison));
        }
    }

    if !settings.blocking_rules_to_generate_predictions.is_empty() {
        text.push_str("\nPairs are selected for comparison by the following blocking rules:\n");
        for rule in &settings.blocking_rules_to_generate_predictions {
            text.push_str(&format!("    - {rule}\n"));
        }
    }
    text
}
