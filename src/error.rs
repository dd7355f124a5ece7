//! Error types for the FDR engine and its data structures.

use thiserror::Error;

use crate::core::data::dataset::Mode;

/// Error type for all fallible operations in the crate.
///
/// Every variant is fatal for the run that raised it. Nothing in the crate
/// retries; callers are expected to abort the analysis and report.
#[derive(Debug, Error)]
pub enum FdrError {
    /// Two inputs that must be index-aligned have different lengths
    #[error("mismatched sizes for {what}: expected {expected}, found {found}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// An FdrMap already holds an entry under this name
    #[error("already have fdr entry for {0}")]
    DuplicateEntry(String),

    /// An FdrMap holds no entry under this name
    #[error("no fdr data for: {0}")]
    NoFdrData(String),

    /// Name lookup into a ranked list or dataset failed
    #[error("{name} not found in {context}")]
    NameNotFound { name: String, context: &'static str },

    /// A name-indexed structure was built with a repeated name
    #[error("duplicate name {name} in {context}")]
    DuplicateName { name: String, context: &'static str },

    /// A required input carries no data
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// A value of the wrong sign was found in a moded dataset
    #[error("value {value} at ({row}, {col}) is not allowed in {mode} mode")]
    ModeViolation {
        row: usize,
        col: usize,
        value: f64,
        mode: Mode,
    },

    /// A moded dataset was paired with the wrong tail
    #[error("expected a {expected} moded dataset, got {found}")]
    ModeMismatch { expected: Mode, found: Mode },

    /// Parameters could not be parsed
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FdrError>;
