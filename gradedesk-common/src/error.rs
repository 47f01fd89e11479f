//! Common error types for gradedesk

use thiserror::Error;

/// Common result type for gradedesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the gradedesk client
#[derive(Error, Debug)]
pub enum Error {
    /// Non-success HTTP response, carrying the server's message
    /// (or a generic fallback when the body had none)
    #[error("{message}")]
    Request { status: u16, message: String },

    /// Server rejected the bearer credential (HTTP 401)
    #[error("{0}")]
    Unauthorized(String),

    /// Connection-level failure before any response arrived
    #[error("Network error: {0}")]
    Transport(String),

    /// Response JSON did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Credential file could not be read or written
    #[error("Credential error: {0}")]
    Credential(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error means the session is no longer valid and the
    /// user has to log in again
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}
