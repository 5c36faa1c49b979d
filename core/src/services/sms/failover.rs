//! Failover dispatcher over an ordered list of SMS providers
//!
//! The dispatcher keeps one shared index naming the active provider. Before
//! each send it checks whether that provider is degraded, meaning its recent
//! error rate is above the threshold or its limiter reports it as limited. A
//! degraded provider is never tried again to confirm the decision: the index
//! moves on by compare-and-swap and the message is queued for the retry worker.
//! The caller that wins the swap clears the abandoned provider's window, so
//! the provider is tried live again once the index comes back around.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use sg_shared::config::FailoverConfig;
use sg_shared::utils::phone::{is_deliverable, mask_recipients};

use crate::domain::entities::sms_message::SmsMessage;
use crate::errors::SmsError;
use crate::repositories::SmsRepository;

use super::error_window::ErrorWindow;
use super::traits::{RateLimiter, SmsProvider};

/// Name the dispatcher reports when used as a provider itself
pub const FAILOVER_PROVIDER_NAME: &str = "failover";

/// Outcome of one delivery attempt through the active provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The provider accepted the message
    Sent { provider: String },
    /// The provider was degraded and nothing was sent
    Deferred { provider: String },
}

/// Dispatches messages through the active provider, failing over on degradation
pub struct FailoverDispatcher {
    providers: Vec<Arc<dyn SmsProvider>>,
    windows: Vec<ErrorWindow>,
    index: AtomicUsize,
    failovers: AtomicU64,
    error_threshold: f64,
    repository: Arc<dyn SmsRepository>,
}

impl FailoverDispatcher {
    /// Create a dispatcher; providers are tried in the given order
    pub fn new(
        providers: Vec<Arc<dyn SmsProvider>>,
        repository: Arc<dyn SmsRepository>,
        config: &FailoverConfig,
    ) -> Result<Self, SmsError> {
        if providers.is_empty() {
            return Err(SmsError::NoProviders);
        }

        let windows = providers
            .iter()
            .map(|_| ErrorWindow::new(config.window_capacity))
            .collect();

        info!(
            providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            error_threshold = config.error_threshold,
            window_capacity = config.window_capacity,
            "Failover dispatcher initialized"
        );

        Ok(Self {
            providers,
            windows,
            index: AtomicUsize::new(0),
            failovers: AtomicU64::new(0),
            error_threshold: config.error_threshold,
            repository,
        })
    }

    /// Index of the currently active provider
    pub fn active_index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    /// The currently active provider
    pub fn active_provider(&self) -> Arc<dyn SmsProvider> {
        Arc::clone(&self.providers[self.active_index()])
    }

    /// Recent error rate of the provider at `index`
    pub fn error_rate(&self, index: usize) -> Option<f64> {
        self.windows.get(index).map(ErrorWindow::error_rate)
    }

    /// Number of provider switches performed so far
    pub fn failover_count(&self) -> u64 {
        self.failovers.load(Ordering::Relaxed)
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Store the retry worker reads from
    pub fn repository(&self) -> Arc<dyn SmsRepository> {
        Arc::clone(&self.repository)
    }

    /// Attempt delivery through the active provider without persisting
    ///
    /// A degraded provider yields `Delivery::Deferred` after advancing the
    /// index. A provider error is recorded in its window and returned.
    pub async fn deliver(
        &self,
        template_id: &str,
        args: &[String],
        recipients: &[String],
    ) -> Result<Delivery, SmsError> {
        let index = self.active_index();
        let provider = &self.providers[index];

        if self.is_degraded(index, provider.as_ref()).await {
            self.advance_from(index);
            return Ok(Delivery::Deferred {
                provider: provider.name().to_string(),
            });
        }

        match provider.send(template_id, args, recipients).await {
            Ok(()) => {
                self.windows[index].record_success();
                debug!(
                    provider = provider.name(),
                    template_id = template_id,
                    recipients = %mask_recipients(recipients),
                    event = "sms_sent",
                    "SMS delivered"
                );
                Ok(Delivery::Sent {
                    provider: provider.name().to_string(),
                })
            }
            Err(e) => {
                self.windows[index].record_failure();
                warn!(
                    provider = provider.name(),
                    error = %e,
                    error_rate = self.windows[index].error_rate(),
                    recipients = %mask_recipients(recipients),
                    event = "sms_send_failed",
                    "SMS provider send failed"
                );
                Err(e)
            }
        }
    }

    async fn is_degraded(&self, index: usize, provider: &dyn SmsProvider) -> bool {
        let error_rate = self.windows[index].error_rate();
        if error_rate > self.error_threshold {
            warn!(
                provider = provider.name(),
                error_rate = error_rate,
                threshold = self.error_threshold,
                event = "provider_degraded",
                "SMS provider error rate above threshold"
            );
            return true;
        }

        match provider.limiter() {
            Some(limiter) => self.is_rate_limited(provider.name(), limiter.as_ref()).await,
            None => false,
        }
    }

    /// Limiter failures count as not limited so delivery keeps flowing
    async fn is_rate_limited(&self, name: &str, limiter: &dyn RateLimiter) -> bool {
        let key = format!("sms:{}", name);
        match limiter.limit(&key).await {
            Ok(true) => {
                warn!(provider = name, event = "provider_rate_limited", "SMS provider rate limited");
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(
                    provider = name,
                    error = %e,
                    event = "limiter_fail_open",
                    "Rate limiter unavailable, treating provider as not limited"
                );
                false
            }
        }
    }

    /// Move the index from `from` to the next provider; only one caller wins per episode
    fn advance_from(&self, from: usize) -> bool {
        let count = self.providers.len();
        if count == 1 {
            // the only provider is tried again with a clean window on the next call
            self.windows[from].reset();
            debug!(provider = self.providers[from].name(), "No alternate SMS provider to fail over to");
            return false;
        }

        let next = (from + 1) % count;
        match self
            .index
            .compare_exchange(from, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                // the provider left behind starts clean once the index wraps back to it
                self.windows[from].reset();
                self.failovers.fetch_add(1, Ordering::Relaxed);
                warn!(
                    from = self.providers[from].name(),
                    to = self.providers[next].name(),
                    event = "provider_failover",
                    "Switched active SMS provider"
                );
                true
            }
            Err(current) => {
                debug!(
                    expected = from,
                    current = current,
                    "Provider index already advanced by another caller"
                );
                false
            }
        }
    }

    async fn persist(
        &self,
        template_id: &str,
        args: &[String],
        recipients: &[String],
    ) -> Result<SmsMessage, SmsError> {
        let message = SmsMessage::new(template_id, args.to_vec(), recipients.to_vec());
        match self.repository.create(message).await {
            Ok(stored) => {
                info!(
                    message_id = %stored.id,
                    template_id = template_id,
                    recipients = %mask_recipients(recipients),
                    event = "sms_persisted",
                    "SMS queued for retry"
                );
                Ok(stored)
            }
            Err(e) => {
                error!(
                    template_id = template_id,
                    recipients = %mask_recipients(recipients),
                    error = %e,
                    "Failed to queue SMS for retry"
                );
                Err(SmsError::persistence(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl SmsProvider for FailoverDispatcher {
    /// Deliver live, or queue the message when the active provider is degraded
    ///
    /// Queuing counts as success. A failed queue write and a provider error
    /// are both returned to the caller.
    async fn send(
        &self,
        template_id: &str,
        args: &[String],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        if recipients.is_empty() || !recipients.iter().all(|r| is_deliverable(r)) {
            return Err(SmsError::InvalidRecipient);
        }

        match self.deliver(template_id, args, recipients).await? {
            Delivery::Sent { .. } => Ok(()),
            Delivery::Deferred { .. } => {
                self.persist(template_id, args, recipients).await?;
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        FAILOVER_PROVIDER_NAME
    }

    fn limiter(&self) -> Option<Arc<dyn RateLimiter>> {
        self.active_provider().limiter()
    }
}
