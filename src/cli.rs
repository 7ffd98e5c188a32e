//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::GradeRecord;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::path::PathBuf;

/// skill-eval - A/B test skill variations against recorded scenarios
///
/// Grades are stored per run under `<evals-dir>/runs/<run-id>/grades.json`
/// and comparison reports are written to `<evals-dir>/reports/`.
///
/// Examples:
///   skill-eval runs
///   skill-eval grade latest --scenario login --skill-set A --success true --score 8
///   skill-eval report latest
///   skill-eval report 20260101_120000 --format json --stdout
///   skill-eval init-config
#[derive(Parser, Debug, Clone)]
#[command(name = "skill-eval", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .skill-eval.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root directory holding runs and reports
    #[arg(long, global = true, value_name = "DIR", env = "SKILL_EVAL_DIR")]
    pub evals_dir: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate the comparison report for a run
    Report(ReportArgs),

    /// Record the grade for one scenario/skill-set pair
    Grade(GradeArgs),

    /// List known runs, oldest first
    Runs,

    /// Generate a default .skill-eval.toml configuration file
    InitConfig,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Run ID (timestamp directory name) or "latest"
    #[arg(value_name = "RUN_ID")]
    pub run_id: String,

    /// Output format (markdown, json)
    ///
    /// Defaults to the [report] format from the config file.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Print the report instead of saving it to the reports directory
    #[arg(long)]
    pub stdout: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GradeArgs {
    /// Run ID (timestamp directory name) or "latest"
    #[arg(value_name = "RUN_ID")]
    pub run_id: String,

    /// Scenario name
    #[arg(long)]
    pub scenario: String,

    /// Skill-set name
    #[arg(long = "skill-set", value_name = "NAME")]
    pub skill_set: String,

    /// Whether the skill set succeeded (omit to leave ungraded)
    #[arg(long, value_name = "BOOL")]
    pub success: Option<bool>,

    /// Numeric score, stored as written (`7` stays `7`, `7.0` stays `7.0`)
    #[arg(long, allow_negative_numbers = true, value_parser = parse_score)]
    pub score: Option<Number>,

    /// Tool usage label: appropriate, partial, inappropriate (or free text)
    #[arg(long = "tool-usage", value_name = "LABEL")]
    pub tool_usage: Option<String>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Grader identifier stored in the grades file
    #[arg(long)]
    pub grader: Option<String>,
}

impl GradeArgs {
    /// The grade record described by these arguments.
    pub fn to_record(&self) -> GradeRecord {
        GradeRecord {
            success: self.success,
            score: self.score.clone(),
            tool_usage: self.tool_usage.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Parse a score, keeping integers as integers.
fn parse_score(s: &str) -> Result<Number, String> {
    if let Ok(n) = s.parse::<i64>() {
        return Ok(Number::from(n));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| format!("invalid score {:?}: expected a finite number", s))
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// File extension used when saving a report in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Command::Grade(ref grade) = self.command {
            if grade.scenario.trim().is_empty() {
                return Err("Scenario name must not be empty".to_string());
            }
            if grade.skill_set.trim().is_empty() {
                return Err("Skill-set name must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
