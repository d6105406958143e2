//! Error types for stats computation, training, and persistence.

use thiserror::Error;

/// Which id column an out-of-range lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    User,
    Movie,
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdKind::User => write!(f, "user"),
            IdKind::Movie => write!(f, "movie"),
        }
    }
}

/// Error type for every fallible operation in the crate.
///
/// Errors are raised at the point of detection and never retried internally:
/// a failed stats run or training session surfaces to the caller as-is.
#[derive(Debug, Error)]
pub enum FactorError {
    /// An operation was attempted before a required prerequisite step.
    #[error("Illegal state: {0}")]
    IllegalState(String),
    /// Parallel arrays (or rows and a column layout) disagree in shape.
    #[error("Invalid shape: expected {expected}, got {got}")]
    Shape { expected: String, got: String },
    /// An aggregate ratio is undefined (zero total count or NaN).
    #[error("Numerical error: {0}")]
    Numeric(String),
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// An input row holds a value that cannot be a rating record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    /// A user or movie id lies outside the arrays sized from the training set.
    #[error("Unknown {kind} id {id}: arrays are sized for ids below {bound}")]
    UnknownId { kind: IdKind, id: usize, bound: usize },
    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for FactorError {
    fn from(err: std::io::Error) -> Self {
        FactorError::Io(err.to_string())
    }
}

impl From<bincode::Error> for FactorError {
    fn from(err: bincode::Error) -> Self {
        FactorError::Serialization(err.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FactorError>;
