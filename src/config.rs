//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.skill-eval.toml` files.

use crate::cli::{Args, OutputFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".skill-eval.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Directory layout.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where runs and reports live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the evaluation tree.
    #[serde(default = "default_evals_dir")]
    pub evals_dir: PathBuf,

    /// Run directories, relative to `evals_dir` unless absolute.
    #[serde(default = "default_runs_dir")]
    pub runs_dir: PathBuf,

    /// Report output, relative to `evals_dir` unless absolute.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            evals_dir: default_evals_dir(),
            runs_dir: default_runs_dir(),
            reports_dir: default_reports_dir(),
        }
    }
}

fn default_evals_dir() -> PathBuf {
    PathBuf::from("evals")
}

fn default_runs_dir() -> PathBuf {
    PathBuf::from("runs")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl PathsConfig {
    /// Resolved runs directory.
    pub fn runs_path(&self) -> PathBuf {
        self.evals_dir.join(&self.runs_dir)
    }

    /// Resolved reports directory.
    pub fn reports_path(&self) -> PathBuf {
        self.evals_dir.join(&self.reports_dir)
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when explicitly provided.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref evals_dir) = args.evals_dir {
            self.paths.evals_dir = evals_dir.clone();
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
