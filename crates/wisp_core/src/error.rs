//! Error types for the wisp crates

use thiserror::Error;

/// Errors raised by the animation engine and its effects
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WispError {
    /// Inconsistent or unparsable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad per-row option override
    #[error("Option override error: {0}")]
    Option(String),

    /// Model, polygon or particle allocation refused
    #[error("Resource allocation failed: {0}")]
    Resource(String),

    /// Extension registration problem
    #[error("Extension error: {0}")]
    Extension(String),

    /// Broken internal invariant (dangling chain link, missing polygon set)
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for WispError {
    fn from(err: anyhow::Error) -> Self {
        WispError::Other(err.to_string())
    }
}

/// Result type for wisp operations
pub type Result<T> = std::result::Result<T, WispError>;
