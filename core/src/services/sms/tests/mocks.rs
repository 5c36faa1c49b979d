//! Mock providers and limiters for dispatcher tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{DomainError, SmsError};
use crate::services::sms::traits::{RateLimiter, SmsProvider};

/// (template_id, args, recipients) of one accepted send
pub type SentMessage = (String, Vec<String>, Vec<String>);

pub struct MockProvider {
    name: String,
    should_fail: AtomicBool,
    calls: AtomicUsize,
    sent: Mutex<Vec<SentMessage>>,
    limiter: Option<Arc<dyn RateLimiter>>,
}

impl MockProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            should_fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            limiter: None,
        }
    }

    pub fn with_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn set_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsProvider for MockProvider {
    async fn send(
        &self,
        template_id: &str,
        args: &[String],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SmsError::provider(&self.name, "mock failure"));
        }
        self.sent.lock().unwrap().push((
            template_id.to_string(),
            args.to_vec(),
            recipients.to_vec(),
        ));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn limiter(&self) -> Option<Arc<dyn RateLimiter>> {
        self.limiter.clone()
    }
}

pub struct MockLimiter {
    limited: AtomicBool,
    should_fail: AtomicBool,
    keys: Mutex<Vec<String>>,
}

impl MockLimiter {
    pub fn new() -> Self {
        Self {
            limited: AtomicBool::new(false),
            should_fail: AtomicBool::new(false),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn limited() -> Self {
        let limiter = Self::new();
        limiter.set_limited(true);
        limiter
    }

    pub fn failing() -> Self {
        let limiter = Self::new();
        limiter.should_fail.store(true, Ordering::SeqCst);
        limiter
    }

    pub fn set_limited(&self, limited: bool) {
        self.limited.store(limited, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateLimiter for MockLimiter {
    async fn limit(&self, key: &str) -> Result<bool, DomainError> {
        self.keys.lock().unwrap().push(key.to_string());
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::internal("limiter backend down"));
        }
        Ok(self.limited.load(Ordering::SeqCst))
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
