//! Redis-backed verification code store
//!
//! Each record is a hash `{code, attempts}` under `phone_code:{biz}:{phone}`
//! with the code lifetime as its TTL. The age of a record is derived from
//! its remaining TTL, so both operations are a single Lua script and no
//! other client can interleave between the check and the write.

use async_trait::async_trait;
use redis::Script;
use std::sync::Arc;
use tracing::{debug, warn};

use sg_core::domain::entities::verification_code::{
    CodeKey, SetCodeOutcome, VerifyCodeOutcome, CODE_TTL_SECONDS, MAX_VERIFY_ATTEMPTS,
    RESEND_INTERVAL_SECONDS,
};
use sg_core::errors::DomainError;
use sg_core::repositories::CodeCache;
use sg_shared::config::CodeConfig;
use sg_shared::utils::phone::mask_phone_number;

use super::redis_client::RedisClient;

// KEYS[1] record key; ARGV: code, ttl seconds, resend interval seconds
// 0 stored, -1 too frequent, -2 record has no expiry
const SET_CODE_SCRIPT: &str = r#"
local key = KEYS[1]
local ttl = tonumber(redis.call("TTL", key))
if ttl == -1 then
    return -2
elseif ttl == -2 or tonumber(ARGV[2]) - ttl >= tonumber(ARGV[3]) then
    redis.call("HSET", key, "code", ARGV[1], "attempts", 0)
    redis.call("EXPIRE", key, tonumber(ARGV[2]))
    return 0
else
    return -1
end
"#;

// KEYS[1] record key; ARGV: input code, max attempts
// 0 matched, -1 attempts exhausted, -2 mismatch, -3 absent, -4 malformed
const VERIFY_CODE_SCRIPT: &str = r#"
local key = KEYS[1]
if redis.call("EXISTS", key) == 0 then
    return -3
end
local code = redis.call("HGET", key, "code")
local attempts = tonumber(redis.call("HGET", key, "attempts"))
if not code or not attempts then
    return -4
end
if attempts >= tonumber(ARGV[2]) then
    return -1
end
if code == ARGV[1] then
    redis.call("DEL", key)
    return 0
end
redis.call("HINCRBY", key, "attempts", 1)
return -2
"#;

/// Verification code store backed by Redis Lua scripts
pub struct RedisCodeCache {
    client: Arc<RedisClient>,
    set_script: Script,
    verify_script: Script,
    ttl_seconds: u64,
    resend_interval_seconds: u64,
    max_attempts: u32,
}

impl RedisCodeCache {
    /// Create a code store with the default code policy
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self {
            client,
            set_script: Script::new(SET_CODE_SCRIPT),
            verify_script: Script::new(VERIFY_CODE_SCRIPT),
            ttl_seconds: CODE_TTL_SECONDS,
            resend_interval_seconds: RESEND_INTERVAL_SECONDS,
            max_attempts: MAX_VERIFY_ATTEMPTS,
        }
    }

    /// Create a code store with an explicit code policy
    pub fn with_config(client: Arc<RedisClient>, config: &CodeConfig) -> Self {
        Self {
            ttl_seconds: config.expiry_seconds,
            resend_interval_seconds: config.resend_interval_seconds,
            max_attempts: config.max_attempts,
            ..Self::new(client)
        }
    }

    fn record_key(&self, key: &CodeKey) -> String {
        self.client.make_key(&key.storage_key())
    }
}

#[async_trait]
impl CodeCache for RedisCodeCache {
    async fn set(&self, key: &CodeKey, code: &str) -> Result<SetCodeOutcome, DomainError> {
        let reply = self
            .client
            .run_script(
                &self.set_script,
                &[self.record_key(key)],
                &[
                    code.to_string(),
                    self.ttl_seconds.to_string(),
                    self.resend_interval_seconds.to_string(),
                ],
            )
            .await?;

        let outcome = SetCodeOutcome::from_script_reply(reply);
        if outcome == SetCodeOutcome::Unknown {
            warn!(
                biz = %key.biz,
                phone = %mask_phone_number(&key.phone),
                reply = reply,
                "Code record in unexpected state"
            );
        } else {
            debug!(biz = %key.biz, phone = %mask_phone_number(&key.phone), outcome = ?outcome, "Code set");
        }
        Ok(outcome)
    }

    async fn verify(&self, key: &CodeKey, input: &str) -> Result<VerifyCodeOutcome, DomainError> {
        let reply = self
            .client
            .run_script(
                &self.verify_script,
                &[self.record_key(key)],
                &[input.to_string(), self.max_attempts.to_string()],
            )
            .await?;

        let outcome = VerifyCodeOutcome::from_script_reply(reply);
        debug!(biz = %key.biz, phone = %mask_phone_number(&key.phone), outcome = ?outcome, "Code verified");
        Ok(outcome)
    }
}
