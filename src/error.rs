//! Error types for repeatr
//!
//! Only fatal, whole-invocation errors live here. A failed run of the task is
//! recorded as a `RunResult`, never raised as an error.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors that can stop a batch before or instead of the summary
#[derive(Debug, Error)]
pub enum RepeatrError {
    /// The runtime used to launch the target could not be found
    #[error("Runtime not found on PATH: {0}")]
    RuntimeNotFound(String),

    /// The target artifact does not exist
    #[error("Target not found: {}", .0.display())]
    TargetNotFound(PathBuf),

    /// The user did not confirm the batch
    #[error("Batch declined by user")]
    Declined,

    /// A count given non-interactively was rejected
    #[error("Invalid run count: {0}")]
    InvalidCount(String),

    /// Standard input closed while waiting for an answer
    #[error("Input closed before a valid answer was given")]
    InputClosed,

    /// Configuration could not be loaded or is inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for repeatr operations
pub type Result<T> = std::result::Result<T, RepeatrError>;
