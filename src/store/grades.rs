//! Grade document persistence.
//!
//! Grades live in a single JSON file inside each run directory. Reading
//! never fails just because nothing has been graded yet; writing goes
//! through a temporary file so an interrupted write can't truncate grades.

use crate::models::{GradeDocument, GradeRecord};
use chrono::{SecondsFormat, Utc};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Name of the grades file inside a run directory.
pub const GRADES_FILE: &str = "grades.json";

/// Errors from reading or writing a run's grades.
#[derive(Debug, Error)]
pub enum GradeStoreError {
    #[error("Failed to read grades file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse grades file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode grades: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write grades file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Run directory does not exist: {}", .0.display())]
    MissingRunDir(PathBuf),
}

/// Path of the grades file for a run directory.
pub fn grades_path(run_dir: &Path) -> PathBuf {
    run_dir.join(GRADES_FILE)
}

/// Load a run's grades.
///
/// Returns `Ok(None)` when the run has no grades file yet.
pub fn load_grades(run_dir: &Path) -> Result<Option<GradeDocument>, GradeStoreError> {
    let path = grades_path(run_dir);

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No grades file at {}", path.display());
            return Ok(None);
        }
        Err(source) => return Err(GradeStoreError::Read { path, source }),
    };

    let doc: GradeDocument = serde_json::from_str(&content)
        .map_err(|source| GradeStoreError::Parse {
            path: path.clone(),
            source,
        })?;

    debug!(
        "Loaded {} graded scenarios from {}",
        doc.results.len(),
        path.display()
    );
    Ok(Some(doc))
}

/// Write a run's grades, replacing any existing file.
pub fn save_grades(run_dir: &Path, doc: &GradeDocument) -> Result<PathBuf, GradeStoreError> {
    if !run_dir.is_dir() {
        return Err(GradeStoreError::MissingRunDir(run_dir.to_path_buf()));
    }

    let path = grades_path(run_dir);
    let content = serde_json::to_string_pretty(doc)?;

    let write_err = |source: io::Error| GradeStoreError::Write {
        path: path.clone(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(run_dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.persist(&path).map_err(|e| write_err(e.error))?;

    info!("Saved grades to {}", path.display());
    Ok(path)
}

/// Record a single grade for a (scenario, skill-set) pair.
///
/// Loads the existing document (or starts an empty one), replaces the
/// record, stamps `graded_at` with the current UTC time and saves. The
/// existing grader is kept unless a new one is given.
pub fn record_grade(
    run_dir: &Path,
    scenario: &str,
    skill_set: &str,
    record: GradeRecord,
    grader: Option<&str>,
) -> Result<GradeDocument, GradeStoreError> {
    if !run_dir.is_dir() {
        return Err(GradeStoreError::MissingRunDir(run_dir.to_path_buf()));
    }

    let mut doc = load_grades(run_dir)?.unwrap_or_default();
    doc.upsert(scenario, skill_set, record);
    doc.graded_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    if let Some(grader) = grader {
        doc.grader = Some(grader.to_string());
    }

    save_grades(run_dir, &doc)?;
    Ok(doc)
}
