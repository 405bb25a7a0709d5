//! Error types for usmkit-demux

use std::path::PathBuf;

/// Errors that can occur while demultiplexing a USM container
#[derive(Debug, thiserror::Error)]
pub enum DemuxError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input does not start with a CRID chunk
    #[error("Not a USM container: {0}")]
    NotUsm(String),

    /// The input ended in the middle of a chunk
    #[error("Truncated chunk at offset {offset:#x}")]
    Truncated { offset: u64 },

    /// A chunk header is inconsistent with its declared size
    #[error("Invalid chunk at offset {offset:#x}: {reason}")]
    InvalidChunk { offset: u64, reason: String },
}

impl DemuxError {
    /// Create an invalid chunk error.
    pub fn invalid_chunk(offset: u64, reason: impl Into<String>) -> Self {
        Self::InvalidChunk {
            offset,
            reason: reason.into(),
        }
    }
}
