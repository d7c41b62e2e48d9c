//! Error types for codebase analysis and graph output.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while analyzing a codebase or writing its graph.
#[derive(Debug, Error)]
pub enum CntxtError {
    /// IO error.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory to analyze does not exist or is not a directory.
    #[error("Directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A collector could not make sense of a file.
    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// The graph file did not show up on disk in time.
    #[error("{} was not created within {seconds}s", path.display())]
    OutputTimeout { path: PathBuf, seconds: u64 },

    /// The graph JSON is missing a field the compressor relies on.
    #[error("Malformed graph document: {0}")]
    MalformedGraph(String),
}

impl CntxtError {
    /// Wrap an IO error with the path it happened at.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        CntxtError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a parse error for a file.
    pub fn parse(path: impl Into<String>, message: impl ToString) -> Self {
        CntxtError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CntxtError>;
