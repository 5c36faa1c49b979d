//! Rate limiting configuration module
//!
//! Limits here apply per SMS provider: each provider gets its own sliding
//! window keyed by `sms:{provider}`.

use serde::{Deserialize, Serialize};

/// Storage backend for the sliding-window limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LimiterBackend {
    Redis,
    Memory,
}

/// Provider rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Length of the trailing window in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Max requests per provider inside one window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Where the window is kept
    #[serde(default = "default_backend")]
    pub backend: LimiterBackend,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_seconds: default_window_seconds(),
            max_requests: default_max_requests(),
            backend: default_backend(),
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("SMS_RATE_LIMIT_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enabled),
            window_seconds: std::env::var("SMS_RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.window_seconds),
            max_requests: std::env::var("SMS_RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_requests),
            backend: match std::env::var("SMS_RATE_LIMIT_BACKEND").as_deref() {
                Ok("memory") => LimiterBackend::Memory,
                _ => defaults.backend,
            },
        }
    }

    /// Create a development configuration (in-process window)
    pub fn development() -> Self {
        Self {
            backend: LimiterBackend::Memory,
            ..Default::default()
        }
    }

    /// Set the window length and request budget
    pub fn with_window(mut self, window_seconds: u64, max_requests: u32) -> Self {
        self.window_seconds = window_seconds;
        self.max_requests = max_requests;
        self
    }
}

fn default_enabled() -> bool {
    true
}

fn default_window_seconds() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    1000
}

fn default_backend() -> LimiterBackend {
    LimiterBackend::Redis
}
