//! Error types for the tech-tree engine.
//!
//! Research gating never produces errors: a node that cannot be researched
//! simply stays locked. These errors cover data loading and ledger
//! bookkeeping only.

use thiserror::Error;

/// Result type alias using [`TechError`].
pub type Result<T> = std::result::Result<T, TechError>;

/// Top-level error type for the tech-tree engine.
#[derive(Debug, Error)]
pub enum TechError {
    /// Two nodes were declared with the same name.
    #[error("Duplicate tech node: {0}")]
    DuplicateNode(String),

    /// A resource was declared twice in the same ledger.
    #[error("Duplicate resource entry: {0}")]
    DuplicateResource(String),

    /// A dependency token could not be parsed.
    #[error("Malformed dependency token '{token}': {reason}")]
    MalformedDependency {
        /// The token as written in the data file.
        token: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Insufficient resources for a deduction.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource name.
        resource: String,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Crediting a resource would overflow its counter.
    #[error("Resource overflow: {0}")]
    ResourceOverflow(String),

    /// Data file parsing error.
    #[error("Failed to parse {what}: {message}")]
    DataParseError {
        /// What was being parsed (file path or data kind).
        what: String,
        /// Error message.
        message: String,
    },
}
