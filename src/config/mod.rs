//! Configuration module for the relay server
//!
//! This module handles relay configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//! The configuration is loaded once at process start and never changes afterwards.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use convai_relay::config::RelayConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = RelayConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = RelayConfig::from_file(&config_path)?;
//!
//! println!("Relay listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

use crate::errors::ConfigResult;

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Default timeout for the signed-URL HTTP exchange
pub const DEFAULT_SIGNED_URL_TIMEOUT_SECONDS: u64 = 10;

/// Default timeout for the upstream websocket handshake
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS: u64 = 10;

/// Default interval between downstream liveness probes
pub const DEFAULT_WS_PING_INTERVAL_SECONDS: u64 = 20;

/// Default time allowed for a downstream liveness reply
pub const DEFAULT_WS_PING_TIMEOUT_SECONDS: u64 = 20;

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Relay configuration
///
/// Contains everything needed to run the relay:
/// - Server settings (host, port, TLS)
/// - Agent settings (identifier, private flag, API key)
/// - Upstream endpoints and timeouts
/// - Downstream keepalive settings
#[derive(Clone)]
pub struct RelayConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Agent settings
    /// Public agent identifier, always required
    pub agent_id: String,
    /// When set, every session exchanges `agent_id` for a signed URL first
    pub agent_private: bool,
    /// Credential used for the signed-URL exchange (private agents only)
    pub api_key: Option<String>,

    // Upstream settings
    /// Base websocket endpoint used for public agents
    pub upstream_ws_url: String,
    /// HTTP endpoint that hands out signed websocket URLs
    pub signed_url_endpoint: String,
    pub signed_url_timeout_seconds: u64,
    pub upstream_connect_timeout_seconds: u64,

    // Downstream keepalive
    /// Seconds between liveness probes; 0 disables probing
    pub ws_ping_interval_seconds: u64,
    pub ws_ping_timeout_seconds: u64,
}

/// Zeroize the credential when the configuration is dropped.
impl Drop for RelayConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.api_key {
            key.zeroize();
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("agent_id", &self.agent_id)
            .field("agent_private", &self.agent_private)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("upstream_ws_url", &self.upstream_ws_url)
            .field("signed_url_endpoint", &self.signed_url_endpoint)
            .field("signed_url_timeout_seconds", &self.signed_url_timeout_seconds)
            .field(
                "upstream_connect_timeout_seconds",
                &self.upstream_connect_timeout_seconds,
            )
            .field("ws_ping_interval_seconds", &self.ws_ping_interval_seconds)
            .field("ws_ping_timeout_seconds", &self.ws_ping_timeout_seconds)
            .finish()
    }
}

impl RelayConfig {
    /// Load configuration from environment variables
    ///
    /// The `.env` file is loaded in `main.rs` before this is called, so values
    /// from it appear here as ordinary environment variables.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `ELEVENLABS_AGENT_ID` is missing
    /// - `AGENT_PRIVATE` is set but `ELEVENLABS_API_KEY` is missing
    /// - A numeric, boolean, or URL variable is malformed
    pub fn from_env() -> ConfigResult<Self> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file, layered over the environment
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    pub fn from_file(path: &PathBuf) -> ConfigResult<Self> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    pub fn signed_url_timeout(&self) -> Duration {
        Duration::from_secs(self.signed_url_timeout_seconds)
    }

    pub fn upstream_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_connect_timeout_seconds)
    }

    /// Downstream keepalive settings, `None` when probing is disabled
    pub fn keepalive(&self) -> Option<KeepaliveConfig> {
        if self.ws_ping_interval_seconds == 0 {
            return None;
        }
        Some(KeepaliveConfig {
            interval: Duration::from_secs(self.ws_ping_interval_seconds),
            timeout: Duration::from_secs(self.ws_ping_timeout_seconds),
        })
    }
}

/// Downstream liveness probing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepaliveConfig {
    /// Time between probes
    pub interval: Duration,
    /// Time allowed for the reply before the session is torn down
    pub timeout: Duration,
}
