//! Business services containing domain logic and use cases.

pub mod code;
pub mod sms;

// Re-export commonly used types
pub use code::{CodeService, CodeServiceConfig, SendCodeResult};
pub use sms::{
    Delivery, ErrorWindow, FailoverDispatcher, RateLimiter, RetryCycleReport, RetryHandle,
    RetryWorker, SmsProvider,
};
