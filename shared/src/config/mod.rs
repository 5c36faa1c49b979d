//! Configuration module with business-specific sub-modules
//!
//! - `cache` - Redis connection used by the code store and limiter
//! - `database` - MySQL pool for the persisted message store
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Per-provider sliding window
//! - `sms` - Providers, failover, retry worker and code policy

pub mod cache;
pub mod database;
pub mod environment;
pub mod rate_limit;
pub mod sms;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::{LimiterBackend, RateLimitConfig};
pub use sms::{
    CodeConfig, FailoverConfig, ProviderConfig, ProviderKind, RetryConfig, SmsConfig,
    DEFAULT_CODE_TEMPLATE_ID,
};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub sms: SmsConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            sms: SmsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig::new("mysql://localhost:3306/smsgate_dev"),
            cache: CacheConfig::default(),
            sms: SmsConfig::default(),
            rate_limit: RateLimitConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig::new("mysql://prod-db:3306/smsgate").with_max_connections(50),
            cache: CacheConfig::new("redis://prod-cache:6379").with_prefix("smsgate"),
            sms: SmsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        if std::env::var("DATABASE_URL").is_ok() {
            config.database = DatabaseConfig::from_env();
        }
        if std::env::var("REDIS_URL").is_ok() {
            config.cache = CacheConfig::from_env();
        }
        config.sms = SmsConfig::from_env();
        config.rate_limit = RateLimitConfig {
            backend: config.rate_limit.backend,
            ..RateLimitConfig::from_env()
        };
        config
    }
}
