pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use config::RelayConfig;
pub use crate::core::*;
pub use errors::{ConfigError, ConfigResult, RelayError, RelayResult};
pub use state::AppState;
