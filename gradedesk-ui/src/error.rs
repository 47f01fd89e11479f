//! Error types for gradedesk-ui
//!
//! Every user action fails with an [`ActionError`], whose variants follow
//! the three categories the status line distinguishes: input validation
//! (nothing was sent), server/transport failures, and camera failures.

use crate::capture::CaptureError;
use thiserror::Error;

/// Failure of a user-triggered action
#[derive(Error, Debug)]
pub enum ActionError {
    /// Missing selection, file or text; caught before any request
    #[error("{0}")]
    Validation(String),

    /// Non-success response, malformed JSON or connection failure
    #[error(transparent)]
    Api(#[from] gradedesk_common::Error),

    /// Camera access denied, unsupported, or frame capture failed
    #[error(transparent)]
    Camera(#[from] CaptureError),
}

impl ActionError {
    pub fn validation(message: impl Into<String>) -> Self {
        ActionError::Validation(message.into())
    }

    /// True when the server rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ActionError::Api(e) if e.is_unauthorized())
    }
}

/// Convenience Result type for actions
pub type ActionResult<T> = std::result::Result<T, ActionError>;
