//! End-to-end delivery flow over the in-memory backends
//!
//! Code service -> failover dispatcher -> providers, with the message store
//! and retry worker picking up what the dispatcher deferred.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use sg_core::errors::{CodeError, DomainError, SmsError};
use sg_core::repositories::SmsRepository;
use sg_core::services::code::{CodeService, CodeServiceConfig};
use sg_core::services::sms::{FailoverDispatcher, RateLimiter, RetryWorker, SmsProvider};
use sg_infra::cache::MemoryCodeCache;
use sg_infra::database::MemorySmsRepository;
use sg_infra::services::MemorySlidingWindowLimiter;
use sg_infra::sms::{create_failover_dispatcher, LocalSmsProvider};
use sg_shared::config::{AppConfig, FailoverConfig, ProviderConfig, RateLimitConfig, RetryConfig};

const PHONE: &str = "+15551234567";

/// Provider that keeps every message it accepts
struct RecordingProvider {
    name: String,
    limiter: Option<Arc<dyn RateLimiter>>,
    sent: Mutex<Vec<(String, Vec<String>, Vec<String>)>>,
}

impl RecordingProvider {
    fn new(name: &str, limiter: Option<Arc<dyn RateLimiter>>) -> Self {
        Self {
            name: name.to_string(),
            limiter,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn last_code(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .and_then(|(_, args, _)| args.first().cloned())
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsProvider for RecordingProvider {
    async fn send(
        &self,
        template_id: &str,
        args: &[String],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        self.sent
            .lock()
            .unwrap()
            .push((template_id.to_string(), args.to_vec(), recipients.to_vec()));
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn limiter(&self) -> Option<Arc<dyn RateLimiter>> {
        self.limiter.clone()
    }
}

struct Harness {
    primary: Arc<RecordingProvider>,
    backup: Arc<LocalSmsProvider>,
    repository: Arc<MemorySmsRepository>,
    dispatcher: Arc<FailoverDispatcher>,
    service: CodeService,
}

/// Primary allows `primary_budget` sends per minute; backup is unlimited
fn harness(primary_budget: u32) -> Harness {
    let limiter: Arc<dyn RateLimiter> = Arc::new(MemorySlidingWindowLimiter::new(
        &RateLimitConfig::development().with_window(60, primary_budget),
    ));
    let primary = Arc::new(RecordingProvider::new("primary", Some(limiter)));
    let backup = Arc::new(LocalSmsProvider::new("backup"));
    let repository = Arc::new(MemorySmsRepository::new());

    let providers: Vec<Arc<dyn SmsProvider>> = vec![primary.clone(), backup.clone()];
    let dispatcher = Arc::new(
        FailoverDispatcher::new(providers, repository.clone(), &FailoverConfig::default())
            .expect("dispatcher"),
    );
    let service = CodeService::new(
        Arc::new(MemoryCodeCache::new()),
        dispatcher.clone(),
        CodeServiceConfig::default(),
    );

    Harness {
        primary,
        backup,
        repository,
        dispatcher,
        service,
    }
}

#[tokio::test]
async fn test_issue_and_verify_code() -> anyhow::Result<()> {
    let h = harness(10);

    let result = h.service.send("login", PHONE).await?;
    assert_eq!(result.biz, "login");

    let code = h.primary.last_code().expect("code delivered");
    assert_eq!(code.len(), 6);

    assert!(!h.service.verify("login", PHONE, "not-it").await?);
    assert!(h.service.verify("login", PHONE, &code).await?);
    // single use
    assert!(!h.service.verify("login", PHONE, &code).await?);
    Ok(())
}

#[tokio::test]
async fn test_resend_inside_interval_is_rejected() -> anyhow::Result<()> {
    let h = harness(10);

    h.service.send("login", PHONE).await?;
    let second = h.service.send("login", PHONE).await;

    assert!(matches!(
        second,
        Err(DomainError::Code(CodeError::SendTooFrequent))
    ));
    assert_eq!(h.primary.count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_rate_limited_primary_queues_then_retry_delivers() -> anyhow::Result<()> {
    let h = harness(1);

    h.service.send("login", PHONE).await?;
    assert_eq!(h.primary.count(), 1);

    // primary is over budget: the code is queued and the dispatcher moves on
    h.service.send("signup", PHONE).await?;
    assert_eq!(h.primary.count(), 1);
    assert_eq!(h.dispatcher.active_index(), 1);
    assert_eq!(h.repository.unsent_count().await, 1);

    let worker = RetryWorker::new(h.dispatcher.clone(), &RetryConfig::default());
    let report = worker.run_cycle().await?;
    assert_eq!(report.sent, 1);
    assert_eq!(h.backup.message_count(), 1);
    assert_eq!(h.repository.unsent_count().await, 0);

    // nothing left for the next cycle
    let next = worker.run_cycle().await?;
    assert_eq!(next.attempted, 0);
    assert_eq!(h.backup.message_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_dispatcher_from_config() -> anyhow::Result<()> {
    let mut config = AppConfig::development();
    config.sms.providers = vec![ProviderConfig::local("first"), ProviderConfig::local("second")];
    let repository = Arc::new(MemorySmsRepository::new());

    let dispatcher = create_failover_dispatcher(&config, repository.clone(), None)?;
    dispatcher
        .send("1877556", &["123456".to_string()], &[PHONE.to_string()])
        .await?;

    assert_eq!(dispatcher.active_provider().name(), "first");
    assert!(repository.get_unsent().await?.is_empty());
    Ok(())
}
