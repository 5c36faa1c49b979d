//! Local SMS provider
//!
//! Writes messages to the log instead of sending them. Used as the
//! development default and as a last-resort entry in the failover list.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use sg_core::errors::SmsError;
use sg_core::services::sms::{RateLimiter, SmsProvider};
use sg_shared::utils::phone::mask_phone_number;

use super::render_message;

pub struct LocalSmsProvider {
    name: String,
    limiter: Option<Arc<dyn RateLimiter>>,
    /// Messages logged so far, one per recipient
    message_count: AtomicU64,
}

impl LocalSmsProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            limiter: None,
            message_count: AtomicU64::new(0),
        }
    }

    pub fn with_limiter(mut self, limiter: Option<Arc<dyn RateLimiter>>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmsProvider for LocalSmsProvider {
    async fn send(
        &self,
        template_id: &str,
        args: &[String],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        let body = render_message(template_id, args);

        for recipient in recipients {
            let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
            info!(
                target: "sms_service",
                provider = %self.name,
                phone = %mask_phone_number(recipient),
                template_id = template_id,
                message_number = count,
                "SMS sent (local)"
            );
            debug!(target: "sms_service", provider = %self.name, content = %body, "Local SMS content");
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn limiter(&self) -> Option<Arc<dyn RateLimiter>> {
        self.limiter.clone()
    }
}
