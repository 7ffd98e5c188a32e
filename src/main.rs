//! skill-eval - A/B evaluation harness for agent skill variants
//!
//! Compares alternative skill configurations against recorded scenarios.
//! Each run's grades are aggregated per skill set and rendered into a
//! comparison report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (bad arguments, unknown run, unreadable grades, write failure)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use cli::{Args, Command, GradeArgs, OutputFormat, ReportArgs};
use config::Config;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args) {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Load config, set up logging and dispatch the subcommand.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    init_logging(&args, &config)?;

    info!("skill-eval v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let runs = store::RunStore::new(config.paths.runs_path());

    match &args.command {
        Command::Report(report_args) => handle_report(report_args, &config, &runs),
        Command::Grade(grade_args) => handle_grade(grade_args, &runs),
        Command::Runs => handle_runs(&runs),
        Command::InitConfig => handle_init_config(Path::new(config::CONFIG_FILE)),
    }
}

/// Handle init-config: generate a default .skill-eval.toml.
fn handle_init_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            path.display()
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    println!("   Edit it to customize the evals, runs and reports directories.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", config::CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}

/// Generate a run's comparison report and save (or print) it.
fn handle_report(args: &ReportArgs, config: &Config, runs: &store::RunStore) -> Result<()> {
    let run_dir = runs.resolve(&args.run_id)?;
    let run_id = store::run_id(&run_dir);
    info!("Generating report for run {}", run_id);

    let grades = store::load_grades(&run_dir)?;
    if grades.as_ref().map_or(true, |doc| doc.is_empty()) {
        warn!("Run {} has no grades yet", run_id);
    }

    let format = args.format.unwrap_or(config.report.format);
    let output = match format {
        OutputFormat::Markdown => report::generate_markdown_report(&run_id, grades.as_ref()),
        OutputFormat::Json => report::generate_json_report(&run_id, grades.as_ref())?,
    };

    if args.stdout {
        println!("{}", output);
        return Ok(());
    }

    let reports_dir = config.paths.reports_path();
    std::fs::create_dir_all(&reports_dir).with_context(|| {
        format!(
            "Failed to create reports directory {}",
            reports_dir.display()
        )
    })?;

    let path = report::write_report(&output, &reports_dir, &run_id, format.extension())
        .with_context(|| format!("Failed to write report for run {}", run_id))?;

    println!("📝 Report saved to: {}", path.display());
    Ok(())
}

/// Record a single grade into a run's grades file.
fn handle_grade(args: &GradeArgs, runs: &store::RunStore) -> Result<()> {
    let run_dir = runs.resolve(&args.run_id)?;
    let run_id = store::run_id(&run_dir);

    let record = args.to_record();
    let icon = record.status_icon();

    let doc = store::record_grade(
        &run_dir,
        &args.scenario,
        &args.skill_set,
        record,
        args.grader.as_deref(),
    )?;

    let graded: usize = doc.results.values().map(|skill_sets| skill_sets.len()).sum();
    println!(
        "✅ Graded {}/{} in run {}: {}",
        args.scenario, args.skill_set, run_id, icon
    );
    println!("   {} grades recorded for this run.", graded);
    println!("   Next: skill-eval report {}", run_id);
    Ok(())
}

/// List runs, marking which ones have grades.
fn handle_runs(runs: &store::RunStore) -> Result<()> {
    let run_ids = runs.list_runs()?;

    if run_ids.is_empty() {
        println!("No runs found in {}", runs.runs_dir().display());
        return Ok(());
    }

    println!("Runs in {}:\n", runs.runs_dir().display());
    for run_id in &run_ids {
        let run_dir = runs.runs_dir().join(run_id);
        let status = match store::load_grades(&run_dir) {
            Ok(Some(doc)) if !doc.is_empty() => {
                let graded: usize = doc.results.values().map(|s| s.len()).sum();
                format!("graded ({} results)", graded)
            }
            Ok(_) => "not graded".to_string(),
            Err(e) => {
                warn!("{}", e);
                "unreadable grades".to_string()
            }
        };
        println!("   {}  {}", run_id, status);
    }

    println!("\n   Total: {} runs", run_ids.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GRADES: &str = r#"{
        "graded_at": "2026-01-01T12:30:00Z",
        "grader": "human",
        "results": {
            "login": {
                "A": {"success": true, "score": 8, "tool_usage": "appropriate"},
                "B": {"success": false, "score": 2, "notes": "timeout"}
            },
            "signup": {
                "A": {"success": true, "score": 9.0}
            }
        }
    }"#;

    fn setup_evals(runs: &[&str]) -> (TempDir, Config) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.evals_dir = temp_dir.path().to_path_buf();

        for run in runs {
            std::fs::create_dir_all(config.paths.runs_path().join(run)).unwrap();
        }
        (temp_dir, config)
    }

    fn report_args(run_id: &str, format: Option<OutputFormat>) -> ReportArgs {
        ReportArgs {
            run_id: run_id.to_string(),
            format,
            stdout: false,
        }
    }

    #[test]
    fn test_init_config_writes_default_and_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(config::CONFIG_FILE);

        handle_init_config(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, Config::default_toml());
        assert!(Config::load(&path).is_ok());

        std::fs::write(&path, "# edited\n").unwrap();
        let err = handle_init_config(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited\n");
    }

    #[test]
    fn test_handle_report_writes_latest_run() {
        let (_temp_dir, config) = setup_evals(&["20251231_235959", "20260101_000000"]);
        let run_dir = config.paths.runs_path().join("20260101_000000");
        std::fs::write(run_dir.join(store::grades::GRADES_FILE), GRADES).unwrap();
        let runs = store::RunStore::new(config.paths.runs_path());

        // The reports directory does not exist yet.
        assert!(!config.paths.reports_path().exists());
        handle_report(&report_args("latest", None), &config, &runs).unwrap();

        let path = config.paths.reports_path().join("20260101_000000.md");
        let written = std::fs::read_to_string(&path).unwrap();

        let doc = store::load_grades(&run_dir).unwrap();
        assert_eq!(
            written,
            report::generate_markdown_report("20260101_000000", doc.as_ref())
        );
        assert!(written.contains("| A | 2/2 (100%) | 8.5 | 1✓ 0~ 0✗ |"));
        assert!(written.contains("- **A**: ✓ (9.0)"));
        assert!(!config
            .paths
            .reports_path()
            .join("20251231_235959.md")
            .exists());
    }

    #[test]
    fn test_handle_report_json_and_ungraded_run() {
        let (_temp_dir, mut config) = setup_evals(&["r1"]);
        config.report.format = OutputFormat::Json;
        let runs = store::RunStore::new(config.paths.runs_path());

        handle_report(&report_args("r1", None), &config, &runs).unwrap();
        let json = std::fs::read_to_string(config.paths.reports_path().join("r1.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["run_id"], "r1");

        // An explicit --format wins over the config default.
        handle_report(&report_args("r1", Some(OutputFormat::Markdown)), &config, &runs).unwrap();
        let markdown =
            std::fs::read_to_string(config.paths.reports_path().join("r1.md")).unwrap();
        assert!(markdown.starts_with("# No grades found"));
    }

    #[test]
    fn test_handle_report_unknown_run() {
        let (_temp_dir, config) = setup_evals(&["r1"]);
        let runs = store::RunStore::new(config.paths.runs_path());

        assert!(handle_report(&report_args("missing", None), &config, &runs).is_err());
        assert!(!config.paths.reports_path().exists());
    }
}
