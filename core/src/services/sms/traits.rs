//! Traits for SMS provider and rate limiter integration

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::{DomainError, SmsError};

/// Sliding-window rate limiter
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request against `key` and report whether the key is over its budget
    ///
    /// # Returns
    /// * `Ok(true)` - The key is currently limited
    /// * `Ok(false)` - The request is allowed
    /// * `Err(DomainError)` - The limiter backend failed
    async fn limit(&self, key: &str) -> Result<bool, DomainError>;
}

/// Uniform send contract over SMS vendors
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Send one templated message to every recipient
    async fn send(
        &self,
        template_id: &str,
        args: &[String],
        recipients: &[String],
    ) -> Result<(), SmsError>;

    /// Provider identity used in logs and limiter keys
    fn name(&self) -> &str;

    /// Limiter guarding this provider, if any
    fn limiter(&self) -> Option<Arc<dyn RateLimiter>> {
        None
    }
}
