//! Environment variable loading.

use super::utils::{env_var, parse_bool, parse_number};
use crate::errors::ConfigResult;

/// Values read from the process environment, before defaults are applied
#[derive(Debug, Default)]
pub(super) struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls_enabled: Option<bool>,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
    pub agent_id: Option<String>,
    pub agent_private: Option<bool>,
    pub api_key: Option<String>,
    pub upstream_ws_url: Option<String>,
    pub signed_url_endpoint: Option<String>,
    pub signed_url_timeout_seconds: Option<u64>,
    pub upstream_connect_timeout_seconds: Option<u64>,
    pub ws_ping_interval_seconds: Option<u64>,
    pub ws_ping_timeout_seconds: Option<u64>,
}

impl EnvConfig {
    pub(super) fn load() -> ConfigResult<Self> {
        Ok(Self {
            host: env_var("HOST"),
            port: env_var("PORT")
                .map(|v| parse_number("PORT", &v))
                .transpose()?,
            tls_enabled: env_var("TLS_ENABLED")
                .map(|v| parse_bool("TLS_ENABLED", &v))
                .transpose()?,
            tls_cert_path: env_var("TLS_CERT_PATH"),
            tls_key_path: env_var("TLS_KEY_PATH"),
            agent_id: env_var("ELEVENLABS_AGENT_ID"),
            // Only "true" enables private mode; any other value means public
            agent_private: env_var("AGENT_PRIVATE").map(|v| v.eq_ignore_ascii_case("true")),
            api_key: env_var("ELEVENLABS_API_KEY"),
            upstream_ws_url: env_var("UPSTREAM_WS_URL"),
            signed_url_endpoint: env_var("SIGNED_URL_ENDPOINT"),
            signed_url_timeout_seconds: env_var("SIGNED_URL_TIMEOUT_SECONDS")
                .map(|v| parse_number("SIGNED_URL_TIMEOUT_SECONDS", &v))
                .transpose()?,
            upstream_connect_timeout_seconds: env_var("UPSTREAM_CONNECT_TIMEOUT_SECONDS")
                .map(|v| parse_number("UPSTREAM_CONNECT_TIMEOUT_SECONDS", &v))
                .transpose()?,
            ws_ping_interval_seconds: env_var("WS_PING_INTERVAL_SECONDS")
                .map(|v| parse_number("WS_PING_INTERVAL_SECONDS", &v))
                .transpose()?,
            ws_ping_timeout_seconds: env_var("WS_PING_TIMEOUT_SECONDS")
                .map(|v| parse_number("WS_PING_TIMEOUT_SECONDS", &v))
                .transpose()?,
        })
    }
}
