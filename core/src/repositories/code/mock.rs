//! Mock implementation of CodeCache for testing

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::entities::verification_code::{CodeKey, SetCodeOutcome, VerifyCodeOutcome};
use crate::errors::DomainError;

use super::r#trait::CodeCache;

/// Mock code store replaying queued outcomes
///
/// When a queue is empty `set` answers `Stored` and `verify` answers `NotFound`.
pub struct MockCodeCache {
    set_outcomes: Arc<Mutex<VecDeque<SetCodeOutcome>>>,
    verify_outcomes: Arc<Mutex<VecDeque<VerifyCodeOutcome>>>,
    stored: Arc<Mutex<Vec<(CodeKey, String)>>>,
    should_fail: bool,
}

impl MockCodeCache {
    pub fn new() -> Self {
        Self {
            set_outcomes: Arc::new(Mutex::new(VecDeque::new())),
            verify_outcomes: Arc::new(Mutex::new(VecDeque::new())),
            stored: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    pub fn push_set(&self, outcome: SetCodeOutcome) {
        self.set_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn push_verify(&self, outcome: VerifyCodeOutcome) {
        self.verify_outcomes.lock().unwrap().push_back(outcome);
    }

    /// Codes passed to `set`, in call order
    pub fn stored(&self) -> Vec<(CodeKey, String)> {
        self.stored.lock().unwrap().clone()
    }
}

impl Default for MockCodeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodeCache for MockCodeCache {
    async fn set(&self, key: &CodeKey, code: &str) -> Result<SetCodeOutcome, DomainError> {
        if self.should_fail {
            return Err(DomainError::internal("Mock code cache failure"));
        }
        self.stored
            .lock()
            .unwrap()
            .push((key.clone(), code.to_string()));
        Ok(self
            .set_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(SetCodeOutcome::Stored))
    }

    async fn verify(&self, _key: &CodeKey, _input: &str) -> Result<VerifyCodeOutcome, DomainError> {
        if self.should_fail {
            return Err(DomainError::internal("Mock code cache failure"));
        }
        Ok(self
            .verify_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(VerifyCodeOutcome::NotFound))
    }
}
