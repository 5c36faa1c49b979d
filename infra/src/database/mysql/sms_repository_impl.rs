//! MySQL implementation of the SmsRepository trait.
//!
//! A message is stored as one `sms_messages` row plus ordered rows in
//! `sms_message_args` and `sms_message_recipients`, all written in a single
//! transaction. State changes are single conditional UPDATE statements, so
//! the row lock held by MySQL for that statement is the only exclusion
//! between the live path and the retry worker.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

use sg_core::domain::entities::sms_message::SmsMessage;
use sg_core::errors::DomainError;
use sg_core::repositories::SmsRepository;

/// MySQL implementation of SmsRepository
pub struct MySqlSmsRepository {
    /// Database connection pool
    pool: MySqlPool,
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::internal(format!("{}: {}", context, e))
}

impl MySqlSmsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a `sms_messages` row into an entity without args or recipients
    fn row_to_message(row: &MySqlRow) -> Result<SmsMessage, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| db_error("Failed to get id", e))?;

        Ok(SmsMessage {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::internal(format!("Invalid UUID: {}", e)))?,
            template_id: row
                .try_get("template_id")
                .map_err(|e| db_error("Failed to get template_id", e))?,
            args: Vec::new(),
            recipients: Vec::new(),
            sent: row
                .try_get("sent")
                .map_err(|e| db_error("Failed to get sent", e))?,
            last_attempt_at: row
                .try_get::<DateTime<Utc>, _>("last_attempt_at")
                .map_err(|e| db_error("Failed to get last_attempt_at", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| db_error("Failed to get created_at", e))?,
        })
    }

    /// Load ordered values from a child table, grouped by message id
    async fn load_children(
        &self,
        query: &str,
        id: Option<Uuid>,
    ) -> Result<HashMap<String, Vec<String>>, DomainError> {
        let mut q = sqlx::query(query);
        if let Some(id) = id {
            q = q.bind(id.to_string());
        }
        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load message details", e))?;

        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            let message_id: String = row
                .try_get("message_id")
                .map_err(|e| db_error("Failed to get message_id", e))?;
            let value: String = row
                .try_get("value")
                .map_err(|e| db_error("Failed to get value", e))?;
            grouped.entry(message_id).or_default().push(value);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl SmsRepository for MySqlSmsRepository {
    async fn create(&self, message: SmsMessage) -> Result<SmsMessage, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;
        let id = message.id.to_string();

        sqlx::query(
            r#"
            INSERT INTO sms_messages (id, template_id, sent, last_attempt_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&message.template_id)
        .bind(message.sent)
        .bind(message.last_attempt_at)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create SMS message", e))?;

        for (position, value) in message.args.iter().enumerate() {
            sqlx::query(
                "INSERT INTO sms_message_args (message_id, position, value) VALUES (?, ?, ?)",
            )
            .bind(&id)
            .bind(position as u32)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to store SMS argument", e))?;
        }

        for (position, recipient) in message.recipients.iter().enumerate() {
            sqlx::query(
                "INSERT INTO sms_message_recipients (message_id, position, recipient) VALUES (?, ?, ?)",
            )
            .bind(&id)
            .bind(position as u32)
            .bind(recipient)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to store SMS recipient", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit SMS message", e))?;

        Ok(message)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SmsMessage>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, template_id, sent, last_attempt_at, created_at
            FROM sms_messages
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Database query failed", e))?;

        let mut message = match row {
            Some(row) => Self::row_to_message(&row)?,
            None => return Ok(None),
        };

        let key = id.to_string();
        message.args = self
            .load_children(
                "SELECT message_id, value FROM sms_message_args WHERE message_id = ? ORDER BY position",
                Some(id),
            )
            .await?
            .remove(&key)
            .unwrap_or_default();
        message.recipients = self
            .load_children(
                "SELECT message_id, recipient AS value FROM sms_message_recipients WHERE message_id = ? ORDER BY position",
                Some(id),
            )
            .await?
            .remove(&key)
            .unwrap_or_default();

        Ok(Some(message))
    }

    async fn get_unsent(&self) -> Result<Vec<SmsMessage>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, template_id, sent, last_attempt_at, created_at
            FROM sms_messages
            WHERE sent = FALSE
            ORDER BY last_attempt_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load unsent SMS messages", e))?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut args = self
            .load_children(
                r#"
                SELECT a.message_id, a.value
                FROM sms_message_args a
                JOIN sms_messages m ON m.id = a.message_id
                WHERE m.sent = FALSE
                ORDER BY a.message_id, a.position
                "#,
                None,
            )
            .await?;
        let mut recipients = self
            .load_children(
                r#"
                SELECT r.message_id, r.recipient AS value
                FROM sms_message_recipients r
                JOIN sms_messages m ON m.id = r.message_id
                WHERE m.sent = FALSE
                ORDER BY r.message_id, r.position
                "#,
                None,
            )
            .await?;

        rows.iter()
            .map(|row| {
                let mut message = Self::row_to_message(row)?;
                let key = message.id.to_string();
                message.args = args.remove(&key).unwrap_or_default();
                message.recipients = recipients.remove(&key).unwrap_or_default();
                Ok(message)
            })
            .collect()
    }

    async fn mark_sent(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE sms_messages SET sent = TRUE WHERE id = ? AND sent = FALSE")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to mark SMS message sent", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_attempt(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE sms_messages SET last_attempt_at = ? WHERE id = ? AND sent = FALSE",
        )
        .bind(at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update SMS last attempt", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        // child rows go with ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM sms_messages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete SMS message", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_sent_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let result =
            sqlx::query("DELETE FROM sms_messages WHERE sent = TRUE AND last_attempt_at < ?")
                .bind(cutoff)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to purge sent SMS messages", e))?;

        Ok(result.rows_affected() as usize)
    }
}
