//! Comparison report generation.
//!
//! This module renders a run's grades as a Markdown comparison report
//! (summary table plus per-scenario detail) or as JSON. Output is sorted
//! at every level so identical grades always render identically.

use crate::analysis::{aggregate_by_skill_set, sorted_stats};
use crate::models::{GradeDocument, GradeRecord, ScenarioGrades, SkillSetStats, ToolUsageTally};
use anyhow::Result;
use serde::Serialize;
use serde_json::Number;
use std::collections::HashMap;

/// Document returned when a run has nothing graded yet.
pub const NO_GRADES_REPORT: &str = "# No grades found\n\nRun `skill-eval grade` first.";

/// Generate the Markdown comparison report for a run.
pub fn generate_markdown_report(run_id: &str, grades: Option<&GradeDocument>) -> String {
    let doc = match grades {
        Some(doc) if !doc.is_empty() => doc,
        _ => return NO_GRADES_REPORT.to_string(),
    };

    let stats = aggregate_by_skill_set(&doc.results);

    let mut lines = Vec::new();
    lines.extend(generate_header(run_id, doc));
    lines.extend(generate_summary_section(&stats));
    lines.extend(generate_scenarios_section(doc));

    lines.join("\n")
}

/// Title and grading metadata.
fn generate_header(run_id: &str, doc: &GradeDocument) -> Vec<String> {
    vec![
        format!("# Eval Report: {}", run_id),
        String::new(),
        format!("Graded: {}", doc.graded_at.as_deref().unwrap_or("Not yet")),
        format!("Grader: {}", doc.grader.as_deref().unwrap_or("unknown")),
        String::new(),
    ]
}

/// Summary section: one table row per skill set, sorted by name.
fn generate_summary_section(stats: &HashMap<String, SkillSetStats>) -> Vec<String> {
    let mut lines = vec!["## Summary".to_string(), String::new()];

    lines.push("| Skill Set | Passed | Avg Score | Tool Usage |".to_string());
    lines.push("|-----------|--------|-----------|------------|".to_string());

    for (name, skill_stats) in sorted_stats(stats) {
        lines.push(generate_summary_row(name, skill_stats));
    }

    lines.push(String::new());
    lines
}

fn generate_summary_row(name: &str, stats: &SkillSetStats) -> String {
    format!(
        "| {} | {}/{} ({:.0}%) | {:.1} | {} |",
        name,
        stats.passed,
        stats.total,
        stats.pass_rate(),
        stats.average_score(),
        stats.tool_usage
    )
}

/// Per-scenario detail, scenarios and skill sets both sorted by name.
fn generate_scenarios_section(doc: &GradeDocument) -> Vec<String> {
    let mut lines = vec!["## By Scenario".to_string(), String::new()];

    let mut scenarios: Vec<_> = doc.results.iter().collect();
    scenarios.sort_by(|a, b| a.0.cmp(b.0));

    for (scenario_name, skill_sets) in scenarios {
        lines.push(format!("### {}", scenario_name));
        lines.push(String::new());
        lines.extend(generate_scenario_lines(skill_sets));
        lines.push(String::new());
    }

    lines
}

fn generate_scenario_lines(skill_sets: &ScenarioGrades) -> Vec<String> {
    let mut sorted: Vec<_> = skill_sets.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    sorted
        .into_iter()
        .map(|(name, record)| generate_record_line(name, record))
        .collect()
}

/// One detail line, e.g. `- **A**: ❌ (2) [tools: partial] - timeout`.
fn generate_record_line(name: &str, record: &GradeRecord) -> String {
    let score = match record.score.as_ref() {
        Some(score) => format!("({})", format_score(score)),
        None => String::new(),
    };
    let tools = match record.tool_usage.as_deref() {
        Some(label) if !label.is_empty() => format!(" [tools: {}]", label),
        _ => String::new(),
    };
    let notes = match record.notes.as_deref() {
        Some(notes) if !notes.is_empty() => format!(" - {}", notes),
        _ => String::new(),
    };

    format!(
        "- **{}**: {} {}{}{}",
        name,
        record.status_icon(),
        score,
        tools,
        notes
    )
}

/// Render a stored score the way it was written.
///
/// Integers print as integers. Floats always carry a fraction or an
/// exponent (`7.0`, `0.25`, `1e+16`, `1.5e-05`): fixed notation for
/// decimal exponents in `-4..16`, scientific with a signed two-digit
/// exponent outside it.
fn format_score(score: &Number) -> String {
    if score.is_i64() || score.is_u64() {
        return score.to_string();
    }
    let value = match score.as_f64() {
        Some(value) => value,
        None => return score.to_string(),
    };

    // `{:e}` gives the shortest round-trip digits, e.g. `1.5e-5`.
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if (-4..16).contains(&exponent) {
        let fixed = value.to_string();
        if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Machine-readable form of the comparison report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub run_id: String,
    pub graded_at: Option<String>,
    pub grader: Option<String>,
    pub skill_sets: Vec<SkillSetSummary>,
}

/// One skill set's row in the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct SkillSetSummary {
    pub name: String,
    pub passed: usize,
    pub total: usize,
    /// Percentage, unrounded.
    pub pass_rate: f64,
    pub avg_score: f64,
    pub tool_usage: ToolUsageTally,
}

impl JsonReport {
    /// Build the JSON report from a run's grades.
    pub fn from_grades(run_id: &str, grades: Option<&GradeDocument>) -> Self {
        let (graded_at, grader, skill_sets) = match grades {
            Some(doc) => {
                let stats = aggregate_by_skill_set(&doc.results);
                let skill_sets = sorted_stats(&stats)
                    .into_iter()
                    .map(|(name, s)| SkillSetSummary {
                        name: name.clone(),
                        passed: s.passed,
                        total: s.total,
                        pass_rate: s.pass_rate(),
                        avg_score: s.average_score(),
                        tool_usage: s.tool_usage,
                    })
                    .collect();
                (doc.graded_at.clone(), doc.grader.clone(), skill_sets)
            }
            None => (None, None, Vec::new()),
        };

        Self {
            run_id: run_id.to_string(),
            graded_at,
            grader,
            skill_sets,
        }
    }
}

/// Generate a JSON report.
pub fn generate_json_report(run_id: &str, grades: Option<&GradeDocument>) -> Result<String> {
    let report = JsonReport::from_grades(run_id, grades);
    serde_json::to_string_pretty(&report).map_err(Into::into)
}
