//! Merging YAML and environment configurations.

use std::path::PathBuf;

use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SIGNED_URL_TIMEOUT_SECONDS,
    DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS, DEFAULT_WS_PING_INTERVAL_SECONDS,
    DEFAULT_WS_PING_TIMEOUT_SECONDS, RelayConfig, TlsConfig,
};
use crate::core::upstream::{ELEVENLABS_CONVAI_WS_URL, ELEVENLABS_SIGNED_URL_ENDPOINT};
use crate::errors::{ConfigError, ConfigResult};

/// Build the final configuration: YAML over environment over defaults.
///
/// A missing agent id is left empty here and reported by validation, so both
/// loading paths share one error.
pub(super) fn merge_config(yaml: Option<YamlConfig>) -> ConfigResult<RelayConfig> {
    let env = EnvConfig::load()?;
    let yaml = yaml.unwrap_or_default();

    let server = yaml.server.unwrap_or_default();
    let agent = yaml.agent.unwrap_or_default();
    let upstream = yaml.upstream.unwrap_or_default();
    let keepalive = yaml.keepalive.unwrap_or_default();
    let tls_yaml = server.tls.unwrap_or_default();

    let tls_enabled = tls_yaml
        .enabled
        .or(env.tls_enabled)
        .unwrap_or(false);
    let tls = if tls_enabled {
        let cert_path = tls_yaml
            .cert_path
            .or(env.tls_cert_path)
            .ok_or(ConfigError::MissingTlsPath("TLS_CERT_PATH"))?;
        let key_path = tls_yaml
            .key_path
            .or(env.tls_key_path)
            .ok_or(ConfigError::MissingTlsPath("TLS_KEY_PATH"))?;
        Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        })
    } else {
        None
    };

    Ok(RelayConfig {
        host: server
            .host
            .or(env.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: server.port.or(env.port).unwrap_or(DEFAULT_PORT),
        tls,
        agent_id: agent.id.or(env.agent_id).unwrap_or_default(),
        agent_private: agent.private.or(env.agent_private).unwrap_or(false),
        api_key: agent.api_key.or(env.api_key),
        upstream_ws_url: upstream
            .ws_url
            .or(env.upstream_ws_url)
            .unwrap_or_else(|| ELEVENLABS_CONVAI_WS_URL.to_string()),
        signed_url_endpoint: upstream
            .signed_url_endpoint
            .or(env.signed_url_endpoint)
            .unwrap_or_else(|| ELEVENLABS_SIGNED_URL_ENDPOINT.to_string()),
        signed_url_timeout_seconds: upstream
            .signed_url_timeout_seconds
            .or(env.signed_url_timeout_seconds)
            .unwrap_or(DEFAULT_SIGNED_URL_TIMEOUT_SECONDS),
        upstream_connect_timeout_seconds: upstream
            .connect_timeout_seconds
            .or(env.upstream_connect_timeout_seconds)
            .unwrap_or(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS),
        ws_ping_interval_seconds: keepalive
            .ping_interval_seconds
            .or(env.ws_ping_interval_seconds)
            .unwrap_or(DEFAULT_WS_PING_INTERVAL_SECONDS),
        ws_ping_timeout_seconds: keepalive
            .ping_timeout_seconds
            .or(env.ws_ping_timeout_seconds)
            .unwrap_or(DEFAULT_WS_PING_TIMEOUT_SECONDS),
    })
}
