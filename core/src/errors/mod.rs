//! Domain-specific error types and error handling.

mod types;


pub use types::{CodeError, SmsError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Code(#[from] CodeError),

    #[error(transparent)]
    Sms(#[from] SmsError),
}

impl DomainError {
    /// Shorthand for an internal error with a message
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Whether the caller is expected to back off rather than retry now
    pub fn is_throttled(&self) -> bool {
        matches!(self, DomainError::Code(CodeError::SendTooFrequent))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
