//! Common error types for AdmitGuard

use thiserror::Error;

/// Common result type for AdmitGuard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the AdmitGuard client crates
#[derive(Error, Debug)]
pub enum Error {
    /// Call did not complete (network failure, timeout). Never a
    /// validation verdict — callers revert to their pre-call state.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status and no usable body
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded into the expected shape,
    /// or the body omitted the `valid` verdict (treated as failed-safe)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid session operation (e.g. admin call without a login)
    #[error("Session error: {0}")]
    Session(String),
}

impl Error {
    /// True for failures that should surface as "retry" rather than a verdict
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
