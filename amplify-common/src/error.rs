//! Common error types for Amplify

use thiserror::Error;

/// Common result type for Amplify operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the graph engine components
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown vertex id, vertex name, or catalog entry
    #[error("Not found: {0}")]
    NotFound(String),

    /// Self-loop, non-positive limit, malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Conflicting state (not expected with idempotent creation)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External catalog collaborator unreachable or misconfigured
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Persistence read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for `Error::NotFound` with a formatted entity description
    pub fn not_found(entity: &str, key: impl std::fmt::Display) -> Self {
        Error::NotFound(format!("{} '{}'", entity, key))
    }

    /// Shorthand for `Error::InvalidArgument`
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}
