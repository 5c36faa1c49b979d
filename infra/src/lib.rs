//! # Infrastructure Layer
//!
//! Concrete adapters behind the traits defined in `sg_core`.
//!
//! ## Architecture
//!
//! - **Cache**: Redis client, Lua-scripted code store and its in-memory twin
//! - **Services**: Sliding-window rate limiters (Redis and in-memory)
//! - **SMS**: Local and Twilio providers plus the failover dispatcher factory
//! - **Database**: MySQL message repository using SQLx and an in-memory store
//!
//! ## Features
//!
//! - `mysql`: Enable the MySQL message repository (default)
//! - `redis-cache`: Enable Redis-backed stores (default)

use sg_core::errors::DomainError;

// Re-export core types for convenience
pub use sg_core::errors::*;

/// Cache module - Redis client and code stores
pub mod cache;

/// Configuration loading
pub mod config;

/// Database module - message repositories
pub mod database;

/// Services module - rate limiters
pub mod services;

/// SMS module - providers and dispatcher wiring
pub mod sms;

/// Tracing subscriber setup
pub mod telemetry;

pub use config::load_config;
pub use telemetry::init_tracing;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),
}

impl From<::config::ConfigError> for InfrastructureError {
    fn from(e: ::config::ConfigError) -> Self {
        InfrastructureError::Config(e.to_string())
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(e: InfrastructureError) -> Self {
        DomainError::Internal {
            message: e.to_string(),
        }
    }
}
