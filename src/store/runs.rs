//! Run directory discovery and run-ID resolution.
//!
//! Each run is a directory under the runs directory, named by a sortable
//! (usually timestamp-based) run ID.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Run ID alias for the most recent run.
pub const LATEST: &str = "latest";

/// Errors from locating runs.
#[derive(Debug, Error)]
pub enum RunStoreError {
    #[error("Run not found: {run_id} (looked in {})", .runs_dir.display())]
    NotFound { run_id: String, runs_dir: PathBuf },

    #[error("No runs found in {}", .0.display())]
    NoRuns(PathBuf),

    #[error("Invalid run ID: {0:?}")]
    InvalidId(String),

    #[error("Failed to list runs: {0}")]
    Walk(#[from] walkdir::Error),
}

/// The run ID of a run directory: its base name.
pub fn run_id(run_dir: &Path) -> String {
    run_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| run_dir.display().to_string())
}

/// Locates run directories under a single runs directory.
#[derive(Debug, Clone)]
pub struct RunStore {
    runs_dir: PathBuf,
}

impl RunStore {
    /// Create a store rooted at `runs_dir`.
    pub fn new(runs_dir: PathBuf) -> Self {
        Self { runs_dir }
    }

    pub fn runs_dir(&self) -> &Path {
        &self.runs_dir
    }

    /// List run IDs, oldest first.
    ///
    /// Hidden directories and plain files are skipped. A missing runs
    /// directory simply has no runs.
    pub fn list_runs(&self) -> Result<Vec<String>, RunStoreError> {
        if !self.runs_dir.is_dir() {
            debug!("Runs directory {} does not exist", self.runs_dir.display());
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in WalkDir::new(&self.runs_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            runs.push(name);
        }

        runs.sort();
        Ok(runs)
    }

    /// Resolve a run ID (or `latest`) to its directory.
    pub fn resolve(&self, run_id: &str) -> Result<PathBuf, RunStoreError> {
        if run_id == LATEST {
            let runs = self.list_runs()?;
            return match runs.last() {
                Some(latest) => {
                    debug!("Resolved {} to run {}", LATEST, latest);
                    Ok(self.runs_dir.join(latest))
                }
                None => Err(RunStoreError::NoRuns(self.runs_dir.clone())),
            };
        }

        if run_id.is_empty()
            || run_id == "."
            || run_id == ".."
            || run_id.contains(['/', '\\'])
        {
            return Err(RunStoreError::InvalidId(run_id.to_string()));
        }

        let run_dir = self.runs_dir.join(run_id);
        if run_dir.is_dir() {
            Ok(run_dir)
        } else {
            Err(RunStoreError::NotFound {
                run_id: run_id.to_string(),
                runs_dir: self.runs_dir.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_runs(names: &[&str]) -> (TempDir, RunStore) {
        let temp_dir = TempDir::new().unwrap();
        for name in names {
            std::fs::create_dir(temp_dir.path().join(name)).unwrap();
        }
        let store = RunStore::new(temp_dir.path().to_path_buf());
        (temp_dir, store)
    }

    #[test]
    fn test_run_id_is_base_name() {
        assert_eq!(
            run_id(Path::new("evals/runs/20260105_101500")),
            "20260105_101500"
        );
    }

    #[test]
    fn test_list_runs_sorted() {
        let (temp_dir, store) =
            make_runs(&["20260105_101500", "20251231_235959", ".scratch", "20260101_000000"]);
        std::fs::write(temp_dir.path().join("notes.txt"), "hi").unwrap();

        let runs = store.list_runs().unwrap();
        assert_eq!(
            runs,
            vec!["20251231_235959", "20260101_000000", "20260105_101500"]
        );
    }

    #[test]
    fn test_list_runs_missing_dir() {
        let store = RunStore::new(PathBuf::from("/definitely/not/here/runs"));
        assert!(store.list_runs().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_latest() {
        let (temp_dir, store) = make_runs(&["20260101_000000", "20260102_000000"]);
        let resolved = store.resolve(LATEST).unwrap();
        assert_eq!(resolved, temp_dir.path().join("20260102_000000"));
    }

    #[test]
    fn test_resolve_latest_without_runs() {
        let (_temp_dir, store) = make_runs(&[]);
        assert!(matches!(
            store.resolve(LATEST),
            Err(RunStoreError::NoRuns(_))
        ));
    }

    #[test]
    fn test_resolve_unknown_and_invalid() {
        let (_temp_dir, store) = make_runs(&["20260101_000000"]);

        assert!(store.resolve("20260101_000000").is_ok());
        assert!(matches!(
            store.resolve("20990101_000000"),
            Err(RunStoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.resolve("../etc"),
            Err(RunStoreError::InvalidId(_))
        ));
        assert!(matches!(store.resolve(""), Err(RunStoreError::InvalidId(_))));
    }
}
