//! Verification code issuance
//!
//! Generates a code, records it atomically in the code store and hands it
//! to the SMS sender. Verification flattens the anti-abuse outcomes into a
//! plain mismatch for callers.

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::CodeServiceConfig;
pub use service::CodeService;
pub use types::SendCodeResult;
