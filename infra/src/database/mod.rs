//! Database module - message repositories
//!
//! This module provides the durable queue behind the failover dispatcher:
//! - Connection pool management (MySQL)
//! - MySQL repository implementation
//! - In-memory repository for development and tests

#[cfg(feature = "mysql")]
pub mod connection;
pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;


// Re-export commonly used types
#[cfg(feature = "mysql")]
pub use connection::{DatabasePool, PoolStatistics};
pub use memory::MemorySmsRepository;
#[cfg(feature = "mysql")]
pub use mysql::MySqlSmsRepository;
