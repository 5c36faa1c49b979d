//! In-memory SMS message repository
//!
//! Process-local queue used in development and tests. Every operation takes
//! the write lock for exactly one record update and never across I/O.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use sg_core::domain::entities::sms_message::SmsMessage;
use sg_core::errors::DomainError;
use sg_core::repositories::SmsRepository;

#[derive(Default)]
pub struct MemorySmsRepository {
    messages: RwLock<HashMap<Uuid, SmsMessage>>,
}

impl MemorySmsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stored messages, sent or not
    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }

    pub async fn unsent_count(&self) -> usize {
        self.messages.read().await.values().filter(|m| !m.sent).count()
    }
}

#[async_trait]
impl SmsRepository for MemorySmsRepository {
    async fn create(&self, message: SmsMessage) -> Result<SmsMessage, DomainError> {
        let mut messages = self.messages.write().await;
        if messages.contains_key(&message.id) {
            return Err(DomainError::internal(format!(
                "SMS message {} already exists",
                message.id
            )));
        }
        messages.insert(message.id, message.clone());
        debug!(message_id = %message.id, "SMS message stored in memory");
        Ok(message)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SmsMessage>, DomainError> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn get_unsent(&self) -> Result<Vec<SmsMessage>, DomainError> {
        let messages = self.messages.read().await;
        let mut unsent: Vec<SmsMessage> = messages.values().filter(|m| !m.sent).cloned().collect();
        unsent.sort_by(|a, b| {
            a.last_attempt_at
                .cmp(&b.last_attempt_at)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(unsent)
    }

    async fn mark_sent(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut messages = self.messages.write().await;
        Ok(match messages.get_mut(&id) {
            Some(message) if !message.sent => {
                message.mark_sent();
                true
            }
            _ => false,
        })
    }

    async fn touch_last_attempt(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut messages = self.messages.write().await;
        Ok(match messages.get_mut(&id) {
            Some(message) if !message.sent => {
                message.touch(at);
                true
            }
            _ => false,
        })
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
