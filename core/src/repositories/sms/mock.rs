//! Mock implementation of SmsRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::sms_message::SmsMessage;
use crate::errors::DomainError;

use super::r#trait::SmsRepository;

/// Mock SMS repository for testing
pub struct MockSmsRepository {
    messages: Arc<RwLock<HashMap<Uuid, SmsMessage>>>,
    fail_create: AtomicBool,
    create_calls: AtomicUsize,
}

impl MockSmsRepository {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(HashMap::new())),
            fail_create: AtomicBool::new(false),
            create_calls: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent `create` fail
    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub async fn all(&self) -> Vec<SmsMessage> {
        self.messages.read().await.values().cloned().collect()
    }
}

impl Default for MockSmsRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsRepository for MockSmsRepository {
    async fn create(&self, message: SmsMessage) -> Result<SmsMessage, DomainError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(DomainError::internal("Mock repository failure"));
        }
        let mut messages = self.messages.write().await;
        messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SmsMessage>, DomainError> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn get_unsent(&self) -> Result<Vec<SmsMessage>, DomainError> {
        let messages = self.messages.read().await;
        let mut unsent: Vec<SmsMessage> = messages.values().filter(|m| !m.sent).cloned().collect();
        unsent.sort_by_key(|m| m.last_attempt_at);
        Ok(unsent)
    }

    async fn mark_sent(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut messages = self.messages.write().await;
        match messages.get_mut(&id) {
            Some(message) if !message.sent => {
                message.mark_sent();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn touch_last_attempt(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut messages = self.messages.write().await;
        match messages.get_mut(&id) {
            Some(message) if !message.sent => {
                message.touch(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.messages.write().await.remove(&id).is_some())
    }

    async fn purge_sent_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut messages = self.messages.write().await;
        let before = messages.len();
        messages.retain(|_, m| !(m.sent && m.last_attempt_at < cutoff));
        Ok(before - messages.len())
    }
}
