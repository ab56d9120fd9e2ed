//! Output writers for grid data and heatmaps.
//!
//! This module handles writing data to disk in various formats:
//! - JSON grid reports
//! - SVG heatmaps
//! - Tabular `.dat` dumps of the raw fio results

pub mod json;
pub mod svg;
pub mod tables;

// Re-export main functions
pub use json::{read_grid_report, write_grid_report};
pub use svg::write_svg;
pub use tables::TableWriter;

use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Create the parent directories of an output file if needed
pub(crate) fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// Prepare the output directory for a run
///
/// The directory is created if missing. Existing files are deleted when
/// `force` is set; otherwise a non-empty directory is refused.
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is a file, or directory is not empty without `force`
/// * `OutputError::WriteFailed` - Directory cannot be created or cleaned
pub fn prepare_output_dir(dir: &Path, force: bool) -> Result<(), OutputError> {
    if dir.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }
    if dir.exists() && !dir.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Output path is not a directory: {}",
            dir.display()
        )));
    }

    fs::create_dir_all(dir)?;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !force {
            return Err(OutputError::InvalidPath(format!(
                "Output directory {} is not empty: use --force to overwrite it",
                dir.display()
            )));
        }
        if path.is_dir() {
            // Only files we wrote ourselves are cleaned up
            return Err(OutputError::InvalidPath(format!(
                "Output directory {} contains subdirectory {}",
                dir.display(),
                path.display()
            )));
        }
        info!("Deleting existing output data {} in output directory", path.display());
        fs::remove_file(&path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_refuses_non_empty_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.dat"), "x").unwrap();

        assert!(prepare_output_dir(dir.path(), false).is_err());
        assert!(dir.path().join("old.dat").exists());
    }

    #[test]
    fn test_prepare_force_cleans_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.dat"), "x").unwrap();

        prepare_output_dir(dir.path(), true).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_prepare_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");

        prepare_output_dir(&nested, false).unwrap();
        assert!(nested.is_dir());
    }
}
