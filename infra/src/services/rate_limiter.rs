//! Sliding-window rate limiters
//!
//! A key is limited once it has `max_requests` accepted requests inside the
//! trailing window. Rejected requests are not recorded, so a key recovers as
//! soon as its oldest accepted request leaves the window.

use async_trait::async_trait;
use chrono::Utc;
use redis::Script;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use sg_core::errors::DomainError;
use sg_core::services::sms::RateLimiter;
use sg_shared::config::RateLimitConfig;

use crate::cache::redis_client::RedisClient;

/// Prefix of limiter keys in Redis
const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit";

// KEYS[1] window key; ARGV: window ms, max requests, now ms, member
// 1 limited, 0 allowed
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local window = tonumber(ARGV[1])
local threshold = tonumber(ARGV[2])
local now = tonumber(ARGV[3])
redis.call("ZREMRANGEBYSCORE", key, "-inf", now - window)
local count = redis.call("ZCARD", key)
if count >= threshold then
    return 1
end
redis.call("ZADD", key, now, ARGV[4])
redis.call("PEXPIRE", key, window)
return 0
"#;

/// Redis sorted-set sliding-window limiter
pub struct RedisSlidingWindowLimiter {
    redis_client: Arc<RedisClient>,
    script: Script,
    window: Duration,
    max_requests: u32,
}

impl RedisSlidingWindowLimiter {
    /// Create a new Redis-based rate limiter
    pub fn new(redis_client: Arc<RedisClient>, config: &RateLimitConfig) -> Self {
        Self {
            redis_client,
            script: Script::new(SLIDING_WINDOW_SCRIPT),
            window: Duration::from_secs(config.window_seconds),
            max_requests: config.max_requests,
        }
    }
}

#[async_trait]
impl RateLimiter for RedisSlidingWindowLimiter {
    async fn limit(&self, key: &str) -> Result<bool, DomainError> {
        let now = Utc::now().timestamp_millis();
        let redis_key = self
            .redis_client
            .make_key(&format!("{}:{}", RATE_LIMIT_KEY_PREFIX, key));

        let reply = self
            .redis_client
            .run_script(
                &self.script,
                &[redis_key],
                &[
                    self.window.as_millis().to_string(),
                    self.max_requests.to_string(),
                    now.to_string(),
                    format!("{}-{}", now, Uuid::new_v4()),
                ],
            )
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to check rate limit: {}", e),
            })?;

        let limited = reply == 1;
        debug!(key = key, limited = limited, "Rate limit checked");
        Ok(limited)
    }
}

/// In-process sliding-window limiter
pub struct MemorySlidingWindowLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    window: Duration,
    max_requests: u32,
}

impl MemorySlidingWindowLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window: Duration::from_secs(config.window_seconds),
            max_requests: config.max_requests,
        }
    }

    /// Requests currently counted for `key`
    pub async fn current(&self, key: &str) -> usize {
        let now = Instant::now();
        let windows = self.windows.lock().await;
        windows
            .get(key)
            .map(|hits| hits.iter().filter(|at| now.duration_since(**at) < self.window).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl RateLimiter for MemorySlidingWindowLimiter {
    async fn limit(&self, key: &str) -> Result<bool, DomainError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let hits = windows.entry(key.to_string()).or_default();

        while let Some(oldest) = hits.front() {
            if now.duration_since(*oldest) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() >= self.max_requests as usize {
            debug!(key = key, count = hits.len(), "Rate limit exceeded");
            return Ok(true);
        }

        hits.push_back(now);
        Ok(false)
    }
}
