//! Shared configuration and utilities for SmsGate
//!
//! This crate has no I/O. It provides:
//! - Configuration types for every layer
//! - Phone number normalization and masking used in logs

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CodeConfig, DatabaseConfig, Environment, FailoverConfig,
    LoggingConfig, ProviderConfig, ProviderKind, RateLimitConfig, RetryConfig, SmsConfig,
};
pub use utils::phone;
