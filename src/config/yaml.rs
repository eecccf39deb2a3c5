use serde::Deserialize;
use std::path::PathBuf;

use crate::errors::{ConfigError, ConfigResult};

/// Complete YAML configuration structure
///
/// This structure represents the full configuration that can be loaded from a YAML file.
/// All fields are optional to allow partial configuration. Anything left out falls back
/// to the environment and then to the built-in defaults.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8000
///   tls:
///     enabled: true
///     cert_path: "/etc/relay/cert.pem"
///     key_path: "/etc/relay/key.pem"
///
/// agent:
///   id: "your-agent-id"
///   private: true
///   api_key: "your-api-key"
///
/// upstream:
///   ws_url: "wss://api.elevenlabs.io/v1/convai/conversation"
///   signed_url_endpoint: "https://api.elevenlabs.io/v1/convai/conversation/get-signed-url"
///   signed_url_timeout_seconds: 10
///   connect_timeout_seconds: 10
///
/// keepalive:
///   ping_interval_seconds: 20
///   ping_timeout_seconds: 20
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub agent: Option<AgentYaml>,
    pub upstream: Option<UpstreamYaml>,
    pub keepalive: Option<KeepaliveYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Agent configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AgentYaml {
    pub id: Option<String>,
    pub private: Option<bool>,
    pub api_key: Option<String>,
}

/// Upstream endpoints from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UpstreamYaml {
    pub ws_url: Option<String>,
    pub signed_url_endpoint: Option<String>,
    pub signed_url_timeout_seconds: Option<u64>,
    pub connect_timeout_seconds: Option<u64>,
}

/// Downstream keepalive from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct KeepaliveYaml {
    pub ping_interval_seconds: Option<u64>,
    pub ping_timeout_seconds: Option<u64>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let config: YamlConfig = serde_yaml::from_str(&contents)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080
  tls:
    enabled: false

agent:
  id: "agent_123"
  private: true
  api_key: "xi-key"

upstream:
  ws_url: "wss://upstream.example.com/conversation"
  signed_url_endpoint: "https://upstream.example.com/get-signed-url"
  signed_url_timeout_seconds: 5
  connect_timeout_seconds: 6

keepalive:
  ping_interval_seconds: 15
  ping_timeout_seconds: 10
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(8080));
        assert_eq!(server.tls.unwrap().enabled, Some(false));

        let agent = config.agent.unwrap();
        assert_eq!(agent.id.as_deref(), Some("agent_123"));
        assert_eq!(agent.private, Some(true));
        assert_eq!(agent.api_key.as_deref(), Some("xi-key"));

        let upstream = config.upstream.unwrap();
        assert_eq!(
            upstream.ws_url.as_deref(),
            Some("wss://upstream.example.com/conversation")
        );
        assert_eq!(upstream.signed_url_timeout_seconds, Some(5));
        assert_eq!(upstream.connect_timeout_seconds, Some(6));

        let keepalive = config.keepalive.unwrap();
        assert_eq!(keepalive.ping_interval_seconds, Some(15));
        assert_eq!(keepalive.ping_timeout_seconds, Some(10));
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
agent:
  id: "agent_only"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.server.is_none());
        assert!(config.upstream.is_none());
        assert_eq!(config.agent.unwrap().id.as_deref(), Some("agent_only"));
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.agent.is_none());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("relay.yaml");
        fs::write(&path, "server:\n  port: 9000\n").unwrap();

        let config = YamlConfig::from_file(&path).unwrap();
        assert_eq!(config.server.unwrap().port, Some(9000));
    }

    #[test]
    fn test_from_file_wrong_type() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("relay.yaml");
        fs::write(&path, "server:\n  port: \"not-a-port\"\n").unwrap();

        let result = YamlConfig::from_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
