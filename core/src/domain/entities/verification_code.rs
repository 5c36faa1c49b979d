//! Verification code records and the outcomes of the atomic store operations.

use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of digits in an issued code
pub const CODE_LENGTH: usize = 6;

/// Lifetime of a code record (10 minutes)
pub const CODE_TTL_SECONDS: u64 = 600;

/// Minimum age of a record before it may be overwritten
pub const RESEND_INTERVAL_SECONDS: u64 = 60;

/// Wrong guesses allowed before the record is locked
pub const MAX_VERIFY_ATTEMPTS: u32 = 3;

/// Prefix of every code record key in the shared store
pub const CODE_KEY_PREFIX: &str = "phone_code";

/// Identity of a code record: one live record per (biz, phone)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeKey {
    /// Scenario the code is scoped to (e.g. "login")
    pub biz: String,
    pub phone: String,
}

impl CodeKey {
    pub fn new(biz: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            biz: biz.into(),
            phone: phone.into(),
        }
    }

    /// Store key, `phone_code:{biz}:{phone}`
    pub fn storage_key(&self) -> String {
        format!("{}:{}:{}", CODE_KEY_PREFIX, self.biz, self.phone)
    }
}

/// Result of an atomic Set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetCodeOutcome {
    /// Record created or overwritten
    Stored,
    /// Existing record is younger than the resend interval
    TooFrequent,
    /// Existing record carries no expiry metadata
    Unknown,
}

impl SetCodeOutcome {
    /// Map the integer reply of the store script
    pub fn from_script_reply(reply: i64) -> Self {
        match reply {
            0 => SetCodeOutcome::Stored,
            -1 => SetCodeOutcome::TooFrequent,
            _ => SetCodeOutcome::Unknown,
        }
    }
}

/// Result of an atomic Verify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyCodeOutcome {
    /// Code matched, record deleted
    Matched,
    /// Code did not match, attempt counted
    Mismatch,
    /// No live record for the key
    NotFound,
    /// Attempt cap reached, record is dead until reissued
    TooManyAttempts,
    /// Record expired while still holding attempts
    Invalidated,
    /// Record in a state the store does not recognise
    Unknown,
}

impl VerifyCodeOutcome {
    /// Map the integer reply of the store script
    pub fn from_script_reply(reply: i64) -> Self {
        match reply {
            0 => VerifyCodeOutcome::Matched,
            -1 => VerifyCodeOutcome::TooManyAttempts,
            -2 => VerifyCodeOutcome::Mismatch,
            -3 => VerifyCodeOutcome::NotFound,
            _ => VerifyCodeOutcome::Unknown,
        }
    }
}

/// Generate a zero-padded numeric code from the OS random source
pub fn generate_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
