//! Error types for backend scaffolding.

use thiserror::Error;

/// Errors raised while rendering or writing a backend project.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A contract file is not valid JSON or not a contract.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The contract holds no schema under any of the expected keys.
    #[error("no schema for page '{page}' (looked for {expected:?}, available {available:?})")]
    MissingSchema {
        page: String,
        expected: Vec<String>,
        available: Vec<String>,
    },

    /// Invalid or missing input (e.g. non-existent directory).
    #[error("{0}")]
    InvalidInput(String),
}

/// Convenience alias for results with [`CodegenError`].
pub type Result<T> = std::result::Result<T, CodegenError>;
