//! # SmsGate Core
//!
//! Core delivery logic and domain layer for SmsGate.
//! This crate contains domain entities, store and repository interfaces,
//! the failover dispatcher with its retry worker, and the verification
//! code service that sits in front of them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
