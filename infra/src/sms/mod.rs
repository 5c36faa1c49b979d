//! SMS Provider Module
//!
//! Concrete providers behind `sg_core::services::sms::SmsProvider` and the
//! factories that assemble them into a failover dispatcher from configuration.
//!
//! ## Providers
//!
//! - **Local**: logs each message, never fails (development default)
//! - **Twilio**: Messages REST API over `reqwest`

pub mod local;
pub mod twilio;


pub use local::LocalSmsProvider;
pub use twilio::TwilioSmsProvider;

use std::sync::Arc;
use tracing::{info, warn};

use sg_core::repositories::SmsRepository;
use sg_core::services::sms::{FailoverDispatcher, RateLimiter, SmsProvider};
use sg_shared::config::{AppConfig, LimiterBackend, ProviderConfig, ProviderKind};

use crate::cache::RedisClient;
use crate::services::{MemorySlidingWindowLimiter, RedisSlidingWindowLimiter};
use crate::InfrastructureError;

/// Render a templated message body, e.g. `1877556: 123456`
pub fn render_message(template_id: &str, args: &[String]) -> String {
    if args.is_empty() {
        template_id.to_string()
    } else {
        format!("{}: {}", template_id, args.join(" "))
    }
}

/// Create an SMS provider from one configured entry
///
/// The limiter is attached only when the entry has `rate_limited` set.
pub fn create_provider(
    config: &ProviderConfig,
    limiter: Option<Arc<dyn RateLimiter>>,
) -> Result<Arc<dyn SmsProvider>, InfrastructureError> {
    let limiter = if config.rate_limited { limiter } else { None };

    let provider: Arc<dyn SmsProvider> = match config.kind {
        ProviderKind::Local => Arc::new(LocalSmsProvider::new(&config.name).with_limiter(limiter)),
        ProviderKind::Twilio => Arc::new(TwilioSmsProvider::new(config)?.with_limiter(limiter)),
    };

    Ok(provider)
}

/// Create the shared provider limiter, if rate limiting is enabled
///
/// A Redis backend without a Redis client falls back to the in-process window.
pub fn create_limiter(
    config: &AppConfig,
    redis_client: Option<Arc<RedisClient>>,
) -> Option<Arc<dyn RateLimiter>> {
    let rate_limit = &config.rate_limit;
    if !rate_limit.enabled {
        info!("SMS provider rate limiting disabled");
        return None;
    }

    let limiter: Arc<dyn RateLimiter> = match (rate_limit.backend, redis_client) {
        (LimiterBackend::Redis, Some(client)) => {
            Arc::new(RedisSlidingWindowLimiter::new(client, rate_limit))
        }
        (LimiterBackend::Redis, None) => {
            warn!("Redis limiter configured without a Redis client, using in-memory window");
            Arc::new(MemorySlidingWindowLimiter::new(rate_limit))
        }
        (LimiterBackend::Memory, _) => Arc::new(MemorySlidingWindowLimiter::new(rate_limit)),
    };

    info!(
        backend = ?rate_limit.backend,
        window_seconds = rate_limit.window_seconds,
        max_requests = rate_limit.max_requests,
        "SMS provider rate limiter created"
    );
    Some(limiter)
}

/// Build every configured provider, in order, behind one failover dispatcher
pub fn create_failover_dispatcher(
    config: &AppConfig,
    repository: Arc<dyn SmsRepository>,
    limiter: Option<Arc<dyn RateLimiter>>,
) -> Result<Arc<FailoverDispatcher>, InfrastructureError> {
    let providers = config
        .sms
        .providers
        .iter()
        .map(|provider| create_provider(provider, limiter.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    let dispatcher = FailoverDispatcher::new(providers, repository, &config.sms.failover)
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    Ok(Arc::new(dispatcher))
}
