//! Main code service implementation

use chrono::{Duration, Utc};
use std::sync::Arc;

use sg_shared::utils::phone::{is_deliverable, mask_phone_number};

use crate::domain::entities::verification_code::{
    generate_code, CodeKey, SetCodeOutcome, VerifyCodeOutcome,
};
use crate::errors::{CodeError, DomainError, DomainResult};
use crate::repositories::CodeCache;
use crate::services::sms::SmsProvider;

use super::config::CodeServiceConfig;
use super::types::SendCodeResult;

/// Issues and verifies SMS verification codes
pub struct CodeService {
    cache: Arc<dyn CodeCache>,
    sender: Arc<dyn SmsProvider>,
    config: CodeServiceConfig,
}

impl CodeService {
    /// Create a new code service
    ///
    /// # Arguments
    ///
    /// * `cache` - Atomic code store
    /// * `sender` - Where codes are sent, usually the failover dispatcher
    /// * `config` - Service configuration
    pub fn new(
        cache: Arc<dyn CodeCache>,
        sender: Arc<dyn SmsProvider>,
        config: CodeServiceConfig,
    ) -> Self {
        Self {
            cache,
            sender,
            config,
        }
    }

    /// Issue a new code for `phone` in scenario `biz`
    ///
    /// # Returns
    ///
    /// * `Ok(SendCodeResult)` - Code stored and handed to the sender
    /// * `Err(DomainError::Code(CodeError::SendTooFrequent))` - A code was issued less than the resend interval ago
    /// * `Err(DomainError::Code(CodeError::Unknown))` - The existing record is corrupted
    /// * `Err(DomainError::Sms(_))` - Delivery failed
    pub async fn send(&self, biz: &str, phone: &str) -> DomainResult<SendCodeResult> {
        Self::validate(biz, phone)?;

        let key = CodeKey::new(biz, phone);
        let code = generate_code(self.config.code_length);

        match self.cache.set(&key, &code).await? {
            SetCodeOutcome::Stored => {}
            SetCodeOutcome::TooFrequent => {
                tracing::warn!(
                    biz = biz,
                    phone = %mask_phone_number(phone),
                    event = "code_send_too_frequent",
                    "Verification code requested within resend interval"
                );
                return Err(CodeError::SendTooFrequent.into());
            }
            SetCodeOutcome::Unknown => {
                tracing::error!(
                    biz = biz,
                    phone = %mask_phone_number(phone),
                    event = "code_store_corrupted",
                    "Verification code record has no expiry"
                );
                return Err(CodeError::Unknown.into());
            }
        }

        self.sender
            .send(&self.config.template_id, &[code], &[phone.to_string()])
            .await?;

        let now = Utc::now();
        tracing::info!(
            biz = biz,
            phone = %mask_phone_number(phone),
            event = "code_sent",
            "Verification code issued"
        );

        Ok(SendCodeResult {
            biz: biz.to_string(),
            phone: phone.to_string(),
            next_resend_at: now + Duration::seconds(self.config.resend_interval_seconds as i64),
            expires_at: now + Duration::seconds(self.config.expiry_seconds as i64),
        })
    }

    /// Verify `input` for `phone` in scenario `biz`
    ///
    /// Too many attempts and invalidated codes are reported as `Ok(false)`,
    /// indistinguishable from a wrong code.
    pub async fn verify(&self, biz: &str, phone: &str, input: &str) -> DomainResult<bool> {
        match self.verify_detailed(biz, phone, input).await {
            Ok(matched) => Ok(matched),
            Err(DomainError::Code(CodeError::VerifyTooManyTimes))
            | Err(DomainError::Code(CodeError::Invalidated)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Verify without hiding the anti-abuse outcomes
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Code matched and was consumed
    /// * `Ok(false)` - Wrong code or no code issued
    /// * `Err(DomainError::Code(CodeError::VerifyTooManyTimes))` - Attempt cap reached
    /// * `Err(DomainError::Code(CodeError::Invalidated))` - Code expired while still live
    pub async fn verify_detailed(&self, biz: &str, phone: &str, input: &str) -> DomainResult<bool> {
        Self::validate(biz, phone)?;
        let key = CodeKey::new(biz, phone);

        match self.cache.verify(&key, input).await? {
            VerifyCodeOutcome::Matched => {
                tracing::info!(
                    biz = biz,
                    phone = %mask_phone_number(phone),
                    event = "code_verified",
                    "Verification code matched"
                );
                Ok(true)
            }
            VerifyCodeOutcome::Mismatch | VerifyCodeOutcome::NotFound => {
                tracing::debug!(biz = biz, phone = %mask_phone_number(phone), "Verification code mismatch");
                Ok(false)
            }
            VerifyCodeOutcome::TooManyAttempts => {
                tracing::warn!(
                    biz = biz,
                    phone = %mask_phone_number(phone),
                    event = "code_too_many_attempts",
                    "Verification code attempts exhausted"
                );
                Err(CodeError::VerifyTooManyTimes.into())
            }
            VerifyCodeOutcome::Invalidated => {
                tracing::warn!(
                    biz = biz,
                    phone = %mask_phone_number(phone),
                    event = "code_invalidated",
                    "Verification code invalidated"
                );
                Err(CodeError::Invalidated.into())
            }
            VerifyCodeOutcome::Unknown => {
                tracing::error!(biz = biz, phone = %mask_phone_number(phone), "Verification code store returned unknown state");
                Err(CodeError::Unknown.into())
            }
        }
    }

    fn validate(biz: &str, phone: &str) -> DomainResult<()> {
        if biz.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "Scenario must not be empty".to_string(),
            });
        }
        if !is_deliverable(phone) {
            return Err(DomainError::Validation {
                message: "Phone number is not deliverable".to_string(),
            });
        }
        Ok(())
    }
}
