//! Report persistence.

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write a rendered report to `<reports_dir>/<run_id>.<extension>`.
///
/// Existing reports are overwritten. The reports directory must already
/// exist; I/O errors are returned as-is.
pub fn write_report(
    content: &str,
    reports_dir: &Path,
    run_id: &str,
    extension: &str,
) -> io::Result<PathBuf> {
    let path = reports_dir.join(format!("{}.{}", run_id, extension));
    debug!("Writing report to {}", path.display());

    std::fs::write(&path, content)?;
    Ok(path)
}
