//! In-process verification code store
//!
//! Every operation holds the map lock for its whole read-check-write, which
//! gives the same per-key atomicity as the Redis scripts. Expired records
//! are dropped lazily: Set overwrites them, Verify reports them as
//! invalidated once and removes them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use sg_core::domain::entities::verification_code::{
    CodeKey, SetCodeOutcome, VerifyCodeOutcome, CODE_TTL_SECONDS, MAX_VERIFY_ATTEMPTS,
    RESEND_INTERVAL_SECONDS,
};
use sg_core::errors::DomainError;
use sg_core::repositories::CodeCache;
use sg_shared::config::CodeConfig;
use sg_shared::utils::phone::mask_phone_number;

#[derive(Debug, Clone)]
struct CodeRecord {
    code: String,
    attempts: u32,
    issued_at: Instant,
    /// None marks a record without expiry metadata
    expires_at: Option<Instant>,
}

/// Verification code store kept in process memory
pub struct MemoryCodeCache {
    records: Mutex<HashMap<CodeKey, CodeRecord>>,
    ttl: Duration,
    resend_interval: Duration,
    max_attempts: u32,
}

impl MemoryCodeCache {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            ttl: Duration::from_secs(CODE_TTL_SECONDS),
            resend_interval: Duration::from_secs(RESEND_INTERVAL_SECONDS),
            max_attempts: MAX_VERIFY_ATTEMPTS,
        }
    }

    pub fn with_config(config: &CodeConfig) -> Self {
        Self {
            ttl: Duration::from_secs(config.expiry_seconds),
            resend_interval: Duration::from_secs(config.resend_interval_seconds),
            max_attempts: config.max_attempts,
            ..Self::new()
        }
    }

    /// Number of records currently held, expired ones included
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every expired record
    ///
    /// # Returns
    /// * Number of records removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| match record.expires_at {
            Some(expires_at) => expires_at > now,
            None => true,
        });
        before - records.len()
    }

    #[cfg(test)]
    pub(crate) async fn strip_expiry(&self, key: &CodeKey) {
        if let Some(record) = self.records.lock().await.get_mut(key) {
            record.expires_at = None;
        }
    }
}

impl Default for MemoryCodeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodeCache for MemoryCodeCache {
    async fn set(&self, key: &CodeKey, code: &str) -> Result<SetCodeOutcome, DomainError> {
        let now = Instant::now();
        let mut records = self.records.lock().await;

        if let Some(existing) = records.get(key) {
            match existing.expires_at {
                None => return Ok(SetCodeOutcome::Unknown),
                Some(expires_at) if expires_at > now => {
                    if now.duration_since(existing.issued_at) < self.resend_interval {
                        debug!(biz = %key.biz, phone = %mask_phone_number(&key.phone), "Code set too frequently");
                        return Ok(SetCodeOutcome::TooFrequent);
                    }
                }
                Some(_) => {}
            }
        }

        records.insert(
            key.clone(),
            CodeRecord {
                code: code.to_string(),
                attempts: 0,
                issued_at: now,
                expires_at: Some(now + self.ttl),
            },
        );
        Ok(SetCodeOutcome::Stored)
    }

    async fn verify(&self, key: &CodeKey, input: &str) -> Result<VerifyCodeOutcome, DomainError> {
        let now = Instant::now();
        let mut records = self.records.lock().await;

        let record = match records.get_mut(key) {
            Some(record) => record,
            None => return Ok(VerifyCodeOutcome::NotFound),
        };

        let expires_at = match record.expires_at {
            Some(expires_at) => expires_at,
            None => return Ok(VerifyCodeOutcome::Unknown),
        };

        if expires_at <= now {
            records.remove(key);
            return Ok(VerifyCodeOutcome::Invalidated);
        }

        if record.attempts >= self.max_attempts {
            return Ok(VerifyCodeOutcome::TooManyAttempts);
        }

        if record.code == input {
            records.remove(key);
            return Ok(VerifyCodeOutcome::Matched);
        }

        record.attempts += 1;
        Ok(VerifyCodeOutcome::Mismatch)
    }
}
