//! Grade aggregation and statistics.
//!
//! This module folds a run's scenario × skill-set grade matrix into
//! per-skill-set statistics.

use crate::models::{RunResults, SkillSetStats};
use std::collections::HashMap;

/// Group grades by skill set and compute pass counts, scores and tool usage.
///
/// A skill set does not have to appear in every scenario; its `total` is
/// the number of scenarios it was graded in.
pub fn aggregate_by_skill_set(results: &RunResults) -> HashMap<String, SkillSetStats> {
    let mut stats: HashMap<String, SkillSetStats> = HashMap::new();

    for skill_sets in results.values() {
        for (skill_set_name, record) in skill_sets {
            let entry = stats.entry(skill_set_name.clone()).or_default();

            entry.total += 1;
            if record.success == Some(true) {
                entry.passed += 1;
            }
            if let Some(score) = record.score_value() {
                entry.scores.push(score);
            }
            // Unrecognized labels are valid data, they just don't count.
            if let Some(usage) = record.tool_usage_class() {
                entry.tool_usage.record(usage);
            }
        }
    }

    stats
}

/// Return the aggregated stats as `(name, stats)` pairs sorted by name.
pub fn sorted_stats(stats: &HashMap<String, SkillSetStats>) -> Vec<(&String, &SkillSetStats)> {
    let mut sorted: Vec<_> = stats.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
}
