//! Structured error types for the NLRcraft pipeline.

use thiserror::Error;

/// Unified error type for all NLRcraft operations.
#[derive(Debug, Error)]
pub enum NlrError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed input data that cannot be skipped)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, out-of-range cutoffs, unsupported formats)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An external program (Foldseek, Rscript, ...) exited unsuccessfully.
    #[error("{program} failed ({status}): {stderr}")]
    Tool {
        program: String,
        status: String,
        stderr: String,
    },
}

impl NlrError {
    /// Wrap an I/O error so the message names the offending path.
    pub fn io_at(path: &std::path::Path, err: std::io::Error) -> Self {
        NlrError::Io(std::io::Error::new(
            err.kind(),
            format!("{}: {}", path.display(), err),
        ))
    }
}

/// Convenience alias used throughout the NLRcraft crates.
pub type Result<T> = std::result::Result<T, NlrError>;
