//! Configuration validation logic.

use url::Url;

use super::RelayConfig;
use crate::errors::{ConfigError, ConfigResult};

/// Validate a fully merged configuration.
pub(super) fn validate(config: &RelayConfig) -> ConfigResult<()> {
    if config.agent_id.trim().is_empty() {
        return Err(ConfigError::MissingAgentId);
    }

    if config.agent_private
        && config
            .api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
    {
        return Err(ConfigError::MissingApiKey);
    }

    validate_url("UPSTREAM_WS_URL", &config.upstream_ws_url, &["ws", "wss"])?;
    validate_url(
        "SIGNED_URL_ENDPOINT",
        &config.signed_url_endpoint,
        &["http", "https"],
    )?;

    if config.signed_url_timeout_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            key: "SIGNED_URL_TIMEOUT_SECONDS",
            value: "0".to_string(),
        });
    }
    if config.upstream_connect_timeout_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            key: "UPSTREAM_CONNECT_TIMEOUT_SECONDS",
            value: "0".to_string(),
        });
    }
    if config.ws_ping_interval_seconds > 0 && config.ws_ping_timeout_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            key: "WS_PING_TIMEOUT_SECONDS",
            value: "0".to_string(),
        });
    }

    if let Some(tls) = &config.tls {
        for (key, path) in [("TLS_CERT_PATH", &tls.cert_path), ("TLS_KEY_PATH", &tls.key_path)] {
            if !path.is_file() {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: path.display().to_string(),
                });
            }
        }
    }

    Ok(())
}

fn validate_url(key: &'static str, value: &str, schemes: &[&str]) -> ConfigResult<()> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        key,
        reason: e.to_string(),
    })?;

    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::InvalidUrl {
            key,
            reason: format!(
                "scheme '{}' not allowed, expected one of {}",
                url.scheme(),
                schemes.join(", ")
            ),
        });
    }

    Ok(())
}
