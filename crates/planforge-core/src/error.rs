//! Error types for task loading and validation.

use thiserror::Error;

/// Main error type for task construction.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Error reading the task input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed task input.
    #[error("malformed task input at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Task format version this build does not understand.
    #[error("unsupported task format version {0}")]
    UnsupportedVersion(i32),

    /// A fact, variable, or operator reference that is out of range.
    #[error("invalid task: {0}")]
    Invalid(String),
}

/// Result type alias for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;
