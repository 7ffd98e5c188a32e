//! Data models for the evaluation harness.
//!
//! This module contains the grade document persisted in a run directory
//! and the per-skill-set statistics derived from it when reporting.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::HashMap;
use std::fmt;

/// Grades for one scenario, keyed by skill-set name.
pub type ScenarioGrades = HashMap<String, GradeRecord>;

/// Grades for a whole run, keyed by scenario name.
pub type RunResults = HashMap<String, ScenarioGrades>;

/// The grading data stored alongside a run's outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeDocument {
    /// When the grades were last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<String>,
    /// Who (or what) produced the grades.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grader: Option<String>,
    /// Scenario name -> skill-set name -> grade.
    #[serde(default)]
    pub results: RunResults,
}

impl GradeDocument {
    /// True when no scenario has been graded yet.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Insert or replace the grade for a (scenario, skill-set) pair.
    pub fn upsert(&mut self, scenario: &str, skill_set: &str, record: GradeRecord) {
        self.results
            .entry(scenario.to_string())
            .or_default()
            .insert(skill_set.to_string(), record);
    }
}

/// The evaluation outcome for one (scenario, skill-set) pair.
///
/// Every field is optional: a record with nothing set is still valid and
/// simply renders as "not yet graded".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    /// `None` means not graded, which is distinct from an explicit failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Kept as the stored JSON number so `7` and `7.0` render as written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Number>,
    /// Free-text label. Only the canonical values feed the summary tally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GradeRecord {
    /// Returns the status glyph for this record.
    pub fn status_icon(&self) -> &'static str {
        match self.success {
            Some(true) => "✓",
            Some(false) => "❌",
            None => "?",
        }
    }

    /// The score as a plain float, for averaging.
    pub fn score_value(&self) -> Option<f64> {
        self.score.as_ref().and_then(Number::as_f64)
    }

    /// The tool-usage label classified, if it is one of the canonical ones.
    pub fn tool_usage_class(&self) -> Option<ToolUsage> {
        self.tool_usage.as_deref().and_then(ToolUsage::from_label)
    }
}

/// Canonical tool-usage classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolUsage {
    Appropriate,
    Partial,
    Inappropriate,
}

impl ToolUsage {
    /// Classify a free-text label, ignoring case.
    ///
    /// Returns `None` for anything outside the three canonical labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "appropriate" => Some(ToolUsage::Appropriate),
            "partial" => Some(ToolUsage::Partial),
            "inappropriate" => Some(ToolUsage::Inappropriate),
            _ => None,
        }
    }

    /// Returns the glyph used in the summary table.
    pub fn glyph(&self) -> &'static str {
        match self {
            ToolUsage::Appropriate => "✓",
            ToolUsage::Partial => "~",
            ToolUsage::Inappropriate => "✗",
        }
    }
}

/// Counts of canonical tool-usage labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUsageTally {
    pub appropriate: usize,
    pub partial: usize,
    pub inappropriate: usize,
}

impl ToolUsageTally {
    /// Bump the counter for one classification.
    pub fn record(&mut self, usage: ToolUsage) {
        match usage {
            ToolUsage::Appropriate => self.appropriate += 1,
            ToolUsage::Partial => self.partial += 1,
            ToolUsage::Inappropriate => self.inappropriate += 1,
        }
    }
}

impl fmt::Display for ToolUsageTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {}{} {}{}",
            self.appropriate,
            ToolUsage::Appropriate.glyph(),
            self.partial,
            ToolUsage::Partial.glyph(),
            self.inappropriate,
            ToolUsage::Inappropriate.glyph()
        )
    }
}

/// Aggregate statistics for one skill set across every scenario in a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillSetStats {
    /// Records with `success == Some(true)`.
    pub passed: usize,
    /// All records seen for this skill set.
    pub total: usize,
    /// Every score present, in the order encountered.
    pub scores: Vec<f64>,
    pub tool_usage: ToolUsageTally,
}

impl SkillSetStats {
    /// Pass rate as a percentage, 0 when nothing was graded.
    pub fn pass_rate(&self) -> f64 {
        if self.total > 0 {
            self.passed as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Mean of the recorded scores, 0 when no record carried a score.
    pub fn average_score(&self) -> f64 {
        if self.scores.is_empty() {
            0.0
        } else {
            self.scores.iter().sum::<f64>() / self.scores.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_usage_from_label() {
        assert_eq!(
            ToolUsage::from_label("appropriate"),
            Some(ToolUsage::Appropriate)
        );
        assert_eq!(ToolUsage::from_label("Partial"), Some(ToolUsage::Partial));
        assert_eq!(
            ToolUsage::from_label("INAPPROPRIATE"),
            Some(ToolUsage::Inappropriate)
        );
        assert_eq!(ToolUsage::from_label("mostly fine"), None);
        assert_eq!(ToolUsage::from_label(""), None);
    }

    #[test]
    fn test_status_icon() {
        let mut record = GradeRecord::default();
        assert_eq!(record.status_icon(), "?");

        record.success = Some(true);
        assert_eq!(record.status_icon(), "✓");

        record.success = Some(false);
        assert_eq!(record.status_icon(), "❌");
    }

    #[test]
    fn test_tally_display() {
        let mut tally = ToolUsageTally::default();
        tally.record(ToolUsage::Appropriate);
        tally.record(ToolUsage::Appropriate);
        tally.record(ToolUsage::Inappropriate);

        assert_eq!(tally.to_string(), "2✓ 0~ 1✗");
    }

    #[test]
    fn test_stats_rates() {
        let stats = SkillSetStats {
            passed: 1,
            total: 4,
            scores: vec![3.0, 4.0],
            tool_usage: ToolUsageTally::default(),
        };
        assert_eq!(stats.pass_rate(), 25.0);
        assert_eq!(stats.average_score(), 3.5);

        let empty = SkillSetStats::default();
        assert_eq!(empty.pass_rate(), 0.0);
        assert_eq!(empty.average_score(), 0.0);
    }

    #[test]
    fn test_parse_grade_document() {
        let json = r#"{
            "graded_at": "2026-01-02T10:00:00Z",
            "results": {
                "login": {
                    "A": {"success": true, "score": 8, "tool_usage": "Appropriate"},
                    "B": {"success": null, "notes": "pending", "reviewer": "kim"}
                }
            }
        }"#;

        let doc: GradeDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.graded_at.as_deref(), Some("2026-01-02T10:00:00Z"));
        assert!(doc.grader.is_none());

        let login = &doc.results["login"];
        assert_eq!(login["A"].score, Some(Number::from(8)));
        assert_eq!(login["A"].score_value(), Some(8.0));
        assert_eq!(login["A"].tool_usage_class(), Some(ToolUsage::Appropriate));
        assert_eq!(login["B"].success, None);
        assert_eq!(login["B"].notes.as_deref(), Some("pending"));
    }

    #[test]
    fn test_missing_results_is_empty() {
        let doc: GradeDocument = serde_json::from_str(r#"{"grader": "human"}"#).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.grader.as_deref(), Some("human"));
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let mut doc = GradeDocument::default();
        doc.upsert("login", "A", GradeRecord::default());
        doc.upsert(
            "login",
            "A",
            GradeRecord {
                success: Some(true),
                ..GradeRecord::default()
            },
        );

        assert_eq!(doc.results.len(), 1);
        assert_eq!(doc.results["login"]["A"].success, Some(true));
    }
}
