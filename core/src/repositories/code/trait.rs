//! Verification code store trait.

use async_trait::async_trait;

use crate::domain::entities::verification_code::{CodeKey, SetCodeOutcome, VerifyCodeOutcome};
use crate::errors::DomainError;

/// Shared keyed store of verification code records
///
/// Both operations must run as one indivisible read-check-write against the
/// record for `key`, so a concurrent Set or Verify never observes the value
/// from before the other's update.
#[async_trait]
pub trait CodeCache: Send + Sync {
    /// Store `code` for `key`
    ///
    /// # Returns
    /// * `Ok(SetCodeOutcome::Stored)` - No record, or the record is older than the resend interval
    /// * `Ok(SetCodeOutcome::TooFrequent)` - Record younger than the resend interval, left untouched
    /// * `Ok(SetCodeOutcome::Unknown)` - Record without expiry metadata
    /// * `Err(DomainError)` - The store could not be reached
    async fn set(&self, key: &CodeKey, code: &str) -> Result<SetCodeOutcome, DomainError>;

    /// Check `input` against the record for `key`
    ///
    /// A match deletes the record. A mismatch increments the attempt count.
    /// Once the count reaches the cap every call returns `TooManyAttempts`.
    async fn verify(&self, key: &CodeKey, input: &str) -> Result<VerifyCodeOutcome, DomainError>;
}
