//! Types for code service results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of issuing a verification code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCodeResult {
    pub biz: String,
    pub phone: String,
    /// Earliest time a new code may be requested for the same key
    pub next_resend_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
