//! Configuration loading
//!
//! # Loading Order
//! 1. Defaults of `AppConfig` for the detected environment
//! 2. Configuration file (if given and present)
//! 3. Environment-specific file next to it (e.g. `config.production.toml`)
//! 4. `SG__`-prefixed environment variables, `__` separating sections
//!    (e.g. `SG__RATE_LIMIT__MAX_REQUESTS=500`)

use std::path::Path;

use sg_shared::config::{AppConfig, Environment};
use tracing::{debug, info};

use crate::InfrastructureError;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "SG";

/// Load the application configuration
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, InfrastructureError> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();
    let defaults = match environment {
        Environment::Production => AppConfig::production(),
        _ => {
            let mut config = AppConfig::development();
            config.environment = environment;
            config
        }
    };

    let mut builder = ::config::Config::builder()
        .add_source(::config::Config::try_from(&defaults)?);

    if let Some(path) = config_path {
        if path.exists() {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(::config::File::from(path));
        }

        let env_specific = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(environment.config_file());
        if env_specific.exists() {
            debug!(path = %env_specific.display(), "Loading environment configuration file");
            builder = builder.add_source(::config::File::from(env_specific));
        }
    }

    builder = builder.add_source(
        ::config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config: AppConfig = builder.build()?.try_deserialize()?;
    validate(&config)?;

    info!(
        environment = %config.environment,
        providers = config.sms.providers.len(),
        "Configuration loaded"
    );

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), InfrastructureError> {
    if config.sms.providers.is_empty() {
        return Err(InfrastructureError::Config(
            "At least one SMS provider must be configured".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.sms.failover.error_threshold) {
        return Err(InfrastructureError::Config(format!(
            "Failover error threshold must be within [0, 1], got {}",
            config.sms.failover.error_threshold
        )));
    }
    if config.rate_limit.window_seconds == 0 {
        return Err(InfrastructureError::Config(
            "Rate limit window must be at least one second".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_shared::config::ProviderKind;
    use std::io::Write;

    #[test]
    fn test_load_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert!(!config.sms.providers.is_empty());
        assert_eq!(config.sms.failover.window_capacity, 100);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[sms]
code_template_id = "42"

[[sms.providers]]
kind = "twilio"
name = "twilio-main"
account_sid = "AC123"
auth_token = "secret"
from_number = "+15550000000"

[[sms.providers]]
kind = "local"
name = "console"

[sms.failover]
error_threshold = 0.3
window_capacity = 50
"#
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.sms.code_template_id, "42");
        assert_eq!(config.sms.providers.len(), 2);
        assert_eq!(config.sms.providers[0].kind, ProviderKind::Twilio);
        assert_eq!(config.sms.providers[1].name, "console");
        assert_eq!(config.sms.failover.error_threshold, 0.3);
        assert_eq!(config.sms.failover.window_capacity, 50);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = AppConfig::default();
        config.sms.failover.error_threshold = 1.5;
        assert!(matches!(validate(&config), Err(InfrastructureError::Config(_))));
    }
}
