//! Engine error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that abort a whole translation.
///
/// Per-node transform failures are not errors at this level; they are
/// collected as diagnostics in the translation report.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to access cache at {path}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read configuration: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Worker task failed: {0}")]
    Worker(String),
}
