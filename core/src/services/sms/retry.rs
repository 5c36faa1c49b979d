//! Background resend of persisted SMS messages
//!
//! Each cycle loads every unsent message, oldest last attempt first, and
//! pushes it through the dispatcher's delivery path so failover and rate
//! limiting apply exactly as they do to live traffic. Store writes happen
//! only after the provider call has returned.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use sg_shared::config::RetryConfig;
use sg_shared::utils::phone::mask_recipients;

use crate::domain::entities::sms_message::SmsMessage;
use crate::errors::DomainError;
use crate::repositories::SmsRepository;

use super::failover::{Delivery, FailoverDispatcher};

/// Summary of one retry cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryCycleReport {
    pub attempted: usize,
    pub sent: usize,
    /// Active provider was degraded, message stays queued
    pub deferred: usize,
    /// Provider returned an error, message stays queued
    pub failed: usize,
}

/// Periodically resends queued messages through the dispatcher
pub struct RetryWorker {
    dispatcher: Arc<FailoverDispatcher>,
    repository: Arc<dyn SmsRepository>,
    interval: Duration,
}

impl RetryWorker {
    pub fn new(dispatcher: Arc<FailoverDispatcher>, config: &RetryConfig) -> Self {
        let repository = dispatcher.repository();
        Self {
            dispatcher,
            repository,
            interval: Duration::from_secs(config.interval_seconds.max(1)),
        }
    }

    /// Run a single retry cycle
    ///
    /// # Returns
    /// * `Ok(RetryCycleReport)` - Counts for this cycle
    /// * `Err(DomainError)` - Unsent messages could not be loaded
    pub async fn run_cycle(&self) -> Result<RetryCycleReport, DomainError> {
        let messages = self.repository.get_unsent().await?;
        let mut report = RetryCycleReport::default();

        if messages.is_empty() {
            debug!("No queued SMS messages to retry");
            return Ok(report);
        }

        for message in messages {
            report.attempted += 1;
            match self
                .dispatcher
                .deliver(&message.template_id, &message.args, &message.recipients)
                .await
            {
                Ok(Delivery::Sent { provider }) => {
                    self.mark_sent(&message, &provider).await;
                    report.sent += 1;
                }
                Ok(Delivery::Deferred { provider }) => {
                    debug!(message_id = %message.id, provider = %provider, "Retry deferred, provider degraded");
                    self.touch(&message).await;
                    report.deferred += 1;
                }
                Err(e) => {
                    warn!(
                        message_id = %message.id,
                        recipients = %mask_recipients(&message.recipients),
                        error = %e,
                        "Retry send failed"
                    );
                    self.touch(&message).await;
                    report.failed += 1;
                }
            }
        }

        info!(
            attempted = report.attempted,
            sent = report.sent,
            deferred = report.deferred,
            failed = report.failed,
            event = "retry_cycle",
            "SMS retry cycle completed"
        );

        Ok(report)
    }

    async fn mark_sent(&self, message: &SmsMessage, provider: &str) {
        match self.repository.mark_sent(message.id).await {
            Ok(true) => info!(message_id = %message.id, provider = provider, "Queued SMS delivered"),
            Ok(false) => debug!(message_id = %message.id, "Queued SMS already marked sent"),
            Err(e) => error!(message_id = %message.id, error = %e, "Failed to mark SMS as sent"),
        }
    }

    async fn touch(&self, message: &SmsMessage) {
        if let Err(e) = self.repository.touch_last_attempt(message.id, Utc::now()).await {
            error!(message_id = %message.id, error = %e, "Failed to update SMS last attempt time");
        }
    }

    /// Start the worker as a background task
    ///
    /// The first cycle runs immediately, then once per interval until
    /// `RetryHandle::shutdown` is called.
    pub fn spawn(self: Arc<Self>) -> RetryHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            info!(interval_seconds = interval.as_secs(), "SMS retry worker started");
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!("SMS retry worker received shutdown signal");
                        break;
                    }
                    _ = timer.tick() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                        if let Err(e) = self.run_cycle().await {
                            error!(error = %e, "SMS retry cycle failed");
                        }
                    }
                }
            }

            info!("SMS retry worker stopped");
        });

        RetryHandle {
            shutdown: shutdown_tx,
            handle,
        }
    }
}

/// Handle to a running retry worker
pub struct RetryHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RetryHandle {
    /// Signal the worker and wait for it to stop
    ///
    /// A cycle already in progress finishes first; a pending interval wait is cut short.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            error!(error = %e, "SMS retry worker terminated abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
