use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::RelayConfig;
use crate::core::upstream::UpstreamConnector;
use crate::errors::RelayResult;

/// Process-wide state shared by every request.
///
/// Immutable after startup apart from the shutdown token.
pub struct AppState {
    pub config: RelayConfig,
    pub connector: UpstreamConnector,
    /// Cancelled on shutdown; each session runs on a child of it
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: RelayConfig) -> RelayResult<Arc<Self>> {
        let connector = UpstreamConnector::new(&config)?;
        Ok(Arc::new(Self {
            config,
            connector,
            shutdown: CancellationToken::new(),
        }))
    }
}
