//! SMS delivery: provider contract, failover dispatcher and retry worker

pub mod error_window;
pub mod failover;
pub mod retry;
pub mod traits;

#[cfg(test)]
pub(crate) mod tests;

pub use error_window::ErrorWindow;
pub use failover::{Delivery, FailoverDispatcher, FAILOVER_PROVIDER_NAME};
pub use retry::{RetryCycleReport, RetryHandle, RetryWorker};
pub use traits::{RateLimiter, SmsProvider};
