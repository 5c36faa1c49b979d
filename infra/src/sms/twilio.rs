//! Twilio SMS provider
//!
//! Sends through the Twilio Messages REST API with one form POST per
//! recipient. The provider does not retry: every failure has to reach the
//! dispatcher so it lands in the provider's error window.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use sg_core::errors::SmsError;
use sg_core::services::sms::{RateLimiter, SmsProvider};
use sg_shared::config::ProviderConfig;
use sg_shared::utils::phone::mask_phone_number;

use crate::InfrastructureError;

use super::render_message;

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

pub struct TwilioSmsProvider {
    client: reqwest::Client,
    name: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
    limiter: Option<Arc<dyn RateLimiter>>,
}

impl std::fmt::Debug for TwilioSmsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSmsProvider")
            .field("name", &self.name)
            .field("account_sid", &self.account_sid)
            .field("from_number", &mask_phone_number(&self.from_number))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TwilioSmsProvider {
    /// Create a provider from its configured entry
    ///
    /// # Returns
    /// * `Err(InfrastructureError::Config)` - Credentials or sender number missing
    pub fn new(config: &ProviderConfig) -> Result<Self, InfrastructureError> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(InfrastructureError::Config(format!(
                "Twilio provider '{}' requires account_sid and auth_token",
                config.name
            )));
        }
        if config.from_number.is_empty() {
            return Err(InfrastructureError::Config(format!(
                "Twilio provider '{}' requires from_number",
                config.name
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            name: config.name.clone(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            base_url: TWILIO_API_BASE.to_string(),
            limiter: None,
        })
    }

    /// Point the provider at another API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_limiter(mut self, limiter: Option<Arc<dyn RateLimiter>>) -> Self {
        self.limiter = limiter;
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }

    async fn send_one(&self, recipient: &str, body: &str) -> Result<(), SmsError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", recipient),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| SmsError::provider(&self.name, format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            debug!(provider = %self.name, phone = %mask_phone_number(recipient), "Twilio accepted SMS");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        warn!(
            provider = %self.name,
            phone = %mask_phone_number(recipient),
            status = status.as_u16(),
            "Twilio rejected SMS"
        );
        Err(SmsError::provider(
            &self.name,
            format!("HTTP {}: {}", status.as_u16(), detail),
        ))
    }
}

#[async_trait]
impl SmsProvider for TwilioSmsProvider {
    async fn send(
        &self,
        template_id: &str,
        args: &[String],
        recipients: &[String],
    ) -> Result<(), SmsError> {
        let body = render_message(template_id, args);
        for recipient in recipients {
            self.send_one(recipient, &body).await?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn limiter(&self) -> Option<Arc<dyn RateLimiter>> {
        self.limiter.clone()
    }
}
