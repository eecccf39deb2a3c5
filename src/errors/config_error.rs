//! Configuration errors.
//!
//! Every variant is fatal at startup: the process refuses to serve with an
//! incomplete or malformed configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ELEVENLABS_AGENT_ID missing: an agent identifier is required")]
    MissingAgentId,

    #[error("ELEVENLABS_API_KEY missing: a private agent requires an API key")]
    MissingApiKey,

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid URL for {key}: {reason}")]
    InvalidUrl { key: &'static str, reason: String },

    #[error("TLS enabled but {0} is not set")]
    MissingTlsPath(&'static str),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
