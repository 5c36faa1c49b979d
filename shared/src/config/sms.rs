//! SMS delivery configuration module
//!
//! Covers the provider list (in failover order), the error-rate failover
//! policy, the background retry worker, and the verification code policy.

use serde::{Deserialize, Serialize};

/// Template id used for verification code messages
pub const DEFAULT_CODE_TEMPLATE_ID: &str = "1877556";

/// Kind of SMS provider backing a configured entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Writes messages to the log, never fails
    Local,
    /// Twilio Messages REST API
    Twilio,
}

/// A single SMS provider entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Provider identity, also used as the rate limiter key suffix
    pub name: String,

    #[serde(default)]
    pub account_sid: String,

    #[serde(default)]
    pub auth_token: String,

    #[serde(default)]
    pub from_number: String,

    /// Attach the shared sliding-window limiter to this provider
    #[serde(default = "default_rate_limited")]
    pub rate_limited: bool,
}

impl ProviderConfig {
    /// Local console provider
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Local,
            name: name.into(),
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            rate_limited: default_rate_limited(),
        }
    }

    /// Twilio provider with credentials
    pub fn twilio(
        name: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            kind: ProviderKind::Twilio,
            name: name.into(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            rate_limited: default_rate_limited(),
        }
    }

    /// Disable rate limiting for this provider
    pub fn without_limiter(mut self) -> Self {
        self.rate_limited = false;
        self
    }
}

/// Error-rate failover policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FailoverConfig {
    /// Switch providers once the error rate exceeds this fraction
    #[serde(default = "default_error_threshold")]
    pub error_threshold: f64,

    /// Number of recent outcomes kept per provider
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            error_threshold: default_error_threshold(),
            window_capacity: default_window_capacity(),
        }
    }
}

/// Background resend of persisted messages
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_enabled")]
    pub enabled: bool,

    /// Seconds between retry cycles
    #[serde(default = "default_retry_interval")]
    pub interval_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_retry_enabled(),
            interval_seconds: default_retry_interval(),
        }
    }
}

/// Verification code policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodeConfig {
    /// Number of digits
    #[serde(default = "default_code_length")]
    pub length: usize,

    /// Lifetime of an issued code in seconds
    #[serde(default = "default_code_expiry")]
    pub expiry_seconds: u64,

    /// Minimum seconds between two issues for the same key
    #[serde(default = "default_resend_interval")]
    pub resend_interval_seconds: u64,

    /// Wrong guesses allowed before the code is locked
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            length: default_code_length(),
            expiry_seconds: default_code_expiry(),
            resend_interval_seconds: default_resend_interval(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// SMS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    #[serde(default = "default_code_template_id")]
    pub code_template_id: String,

    /// Providers in failover order
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub failover: FailoverConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub code: CodeConfig,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            code_template_id: default_code_template_id(),
            providers: default_providers(),
            failover: FailoverConfig::default(),
            retry: RetryConfig::default(),
            code: CodeConfig::default(),
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    ///
    /// A Twilio provider is placed first when `TWILIO_ACCOUNT_SID` is set,
    /// with the local provider kept as the last resort.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(template) = std::env::var("SMS_CODE_TEMPLATE_ID") {
            config.code_template_id = template;
        }

        if let Ok(account_sid) = std::env::var("TWILIO_ACCOUNT_SID") {
            let auth_token = std::env::var("TWILIO_AUTH_TOKEN").unwrap_or_default();
            let from_number = std::env::var("TWILIO_FROM_NUMBER").unwrap_or_default();
            config
                .providers
                .insert(0, ProviderConfig::twilio("twilio", account_sid, auth_token, from_number));
        }

        if let Some(threshold) = std::env::var("SMS_FAILOVER_ERROR_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.failover.error_threshold = threshold;
        }

        if let Some(interval) = std::env::var("SMS_RETRY_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.retry.interval_seconds = interval;
        }

        config
    }

    /// Replace the provider list
    pub fn with_providers(mut self, providers: Vec<ProviderConfig>) -> Self {
        self.providers = providers;
        self
    }

    /// Set the failover error threshold and window size
    pub fn with_failover(mut self, error_threshold: f64, window_capacity: usize) -> Self {
        self.failover = FailoverConfig {
            error_threshold,
            window_capacity,
        };
        self
    }
}

fn default_code_template_id() -> String {
    DEFAULT_CODE_TEMPLATE_ID.to_string()
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![ProviderConfig::local("local")]
}

fn default_rate_limited() -> bool {
    true
}

fn default_error_threshold() -> f64 {
    0.5
}

fn default_window_capacity() -> usize {
    100
}

fn default_retry_enabled() -> bool {
    true
}

fn default_retry_interval() -> u64 {
    30
}

fn default_code_length() -> usize {
    6
}

fn default_code_expiry() -> u64 {
    600 // 10 minutes
}

fn default_resend_interval() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}
