//! Code service configuration

use sg_shared::config::SmsConfig;

use crate::domain::entities::verification_code::{
    CODE_LENGTH, CODE_TTL_SECONDS, RESEND_INTERVAL_SECONDS,
};

/// Configuration for the code service
#[derive(Debug, Clone)]
pub struct CodeServiceConfig {
    /// SMS template carrying the code as its single argument
    pub template_id: String,
    pub code_length: usize,
    pub expiry_seconds: u64,
    pub resend_interval_seconds: u64,
}

impl Default for CodeServiceConfig {
    fn default() -> Self {
        Self {
            template_id: sg_shared::config::DEFAULT_CODE_TEMPLATE_ID.to_string(),
            code_length: CODE_LENGTH,
            expiry_seconds: CODE_TTL_SECONDS,
            resend_interval_seconds: RESEND_INTERVAL_SECONDS,
        }
    }
}

impl From<&SmsConfig> for CodeServiceConfig {
    fn from(config: &SmsConfig) -> Self {
        Self {
            template_id: config.code_template_id.clone(),
            code_length: config.code.length,
            expiry_seconds: config.code.expiry_seconds,
            resend_interval_seconds: config.code.resend_interval_seconds,
        }
    }
}
