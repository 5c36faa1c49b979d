//! Persisted SMS message awaiting delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An SMS that could not be delivered live and is queued for the retry worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub id: Uuid,

    pub template_id: String,

    /// Template arguments, order preserved
    pub args: Vec<String>,

    /// Recipients, order preserved
    pub recipients: Vec<String>,

    pub sent: bool,

    /// Last time a delivery was attempted or the message was queued
    pub last_attempt_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}

impl SmsMessage {
    /// Create an unsent message stamped with the current time
    pub fn new(template_id: impl Into<String>, args: Vec<String>, recipients: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            template_id: template_id.into(),
            args,
            recipients,
            sent: false,
            last_attempt_at: now,
            created_at: now,
        }
    }

    pub fn mark_sent(&mut self) {
        self.sent = true;
    }

    /// Record a failed attempt at `at`
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_attempt_at = at;
    }
}
