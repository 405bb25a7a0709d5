//! Errors that end a whole run rather than a single file.

use std::path::PathBuf;

/// Run-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input path named on the command line does not exist.
    #[error("The file {} cannot be found", .0.display())]
    FileNotFound(PathBuf),

    /// An I/O error occurred while enumerating inputs.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }
}

/// Result type alias using the run-level Error type.
pub type Result<T> = std::result::Result<T, Error>;
