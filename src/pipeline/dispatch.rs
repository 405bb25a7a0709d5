//! Resolves a command-line path to container files and runs each through the
//! pipeline.

use super::executor::{FileReport, Pipeline};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use usmkit_demux::is_usm_file;
use walkdir::WalkDir;

/// A file whose processing failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of a dispatch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// Number of files attempted
    pub fn total(&self) -> usize {
        self.files.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// List the container files named by `input`.
///
/// A file is returned as-is. A directory yields its `.usm` files
/// (case-insensitive), without recursing, sorted by name.
pub fn discover(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }

    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.path().is_file() && is_usm_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("Found {} container files in {:?}", files.len(), input);
    Ok(files)
}

/// Process every file named by `input`.
///
/// Only a missing input fails the run. Per-file failures are logged and
/// collected in the report.
pub fn dispatch(input: &Path, pipeline: &Pipeline) -> Result<BatchReport> {
    let files = discover(input)?;
    let mut report = BatchReport::default();

    for path in files {
        match pipeline.process(&path) {
            Ok(file_report) => report.files.push(file_report),
            Err(e) => {
                tracing::error!("Failed to process {:?}: {:#}", path, e);
                report.failures.push(FileFailure {
                    path,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    Ok(report)
}
