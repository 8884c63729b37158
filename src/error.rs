//! Error types for mmduck
//!
//! Errors are used inside the store and the engine; both convert them into
//! booleans or [`ExecutionResult`](crate::executor::ExecutionResult)s at their
//! public boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in mmduck
#[derive(Debug, Error)]
pub enum MmduckError {
    /// Reading or writing the shortcut file failed
    #[error("Config I/O error on {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shortcut file is not valid JSON for a config
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// No shortcut with this id
    #[error("shortcut not found: {0}")]
    NotFound(String),

    /// The URL could not be parsed
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Activating, launching, opening or running failed at the OS level
    #[error("{0}")]
    Execution(String),

    /// Creating or removing a temporary script file failed
    #[error("{0}")]
    TempResource(String),
}

/// Result type alias for mmduck operations
pub type MmduckResult<T> = Result<T, MmduckError>;
