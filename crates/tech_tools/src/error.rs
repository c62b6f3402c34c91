//! Error types for the tools.

use std::path::PathBuf;

use tech_core::error::TechError;
use thiserror::Error;

/// Errors that can occur while running a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A data file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A data file was read but did not load.
    #[error("{}: {source}", path.display())]
    Data {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: TechError,
    },

    /// The data loaded but could not be assembled into a session.
    #[error(transparent)]
    Engine(#[from] TechError),

    /// Validation found problems.
    #[error("{0} validation issue(s) found")]
    Invalid(usize),

    /// A report could not be encoded.
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;
