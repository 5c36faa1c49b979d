//! Repository trait for persisted SMS messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::sms_message::SmsMessage;
use crate::errors::DomainError;

/// Durable queue of messages that could not be delivered live
///
/// Writers are the failover dispatcher (create) and the retry worker
/// (mark_sent, touch_last_attempt). Each update is a single conditional
/// write on one record, so concurrent writers never lose an update.
#[async_trait]
pub trait SmsRepository: Send + Sync {
    /// Persist a new message
    ///
    /// # Returns
    /// * `Ok(SmsMessage)` - The stored message
    /// * `Err(DomainError)` - Storage failed; the message is lost unless the caller propagates
    async fn create(&self, message: SmsMessage) -> Result<SmsMessage, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SmsMessage>, DomainError>;

    /// All unsent messages, oldest last attempt first
    async fn get_unsent(&self) -> Result<Vec<SmsMessage>, DomainError>;

    /// Flip `sent` to true if it is still false
    ///
    /// # Returns
    /// * `Ok(true)` - This call marked the message sent
    /// * `Ok(false)` - Already sent, or no such message
    async fn mark_sent(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Stamp the last attempt time of a message that is still unsent
    async fn touch_last_attempt(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Delete sent messages whose last attempt is before `cutoff`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of messages removed
    async fn purge_sent_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;
}
