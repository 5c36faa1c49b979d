//! Error types for verification codes and SMS delivery

use thiserror::Error;

/// Verification code errors
///
/// `VerifyTooManyTimes` and `Invalidated` are flattened to a plain
/// "code did not match" by the code service before reaching callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("Verification code sent too frequently")]
    SendTooFrequent,

    #[error("Verification code checked too many times")]
    VerifyTooManyTimes,

    #[error("Verification code invalidated")]
    Invalidated,

    #[error("Verification code store returned an unknown state")]
    Unknown,
}

/// SMS delivery errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    /// A single send through a provider failed
    #[error("SMS provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    /// An undeliverable message could not be queued for retry
    #[error("Failed to persist SMS message: {message}")]
    Persistence { message: String },

    #[error("No SMS providers configured")]
    NoProviders,

    #[error("Invalid SMS recipient")]
    InvalidRecipient,
}

impl SmsError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        SmsError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        SmsError::Persistence {
            message: message.into(),
        }
    }
}
