//! Relay WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::relay::relay_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the relay router
///
/// # Endpoint
///
/// Any path not claimed by another router: websocket upgrade with the
/// `convai` subprotocol. The browser client connects to `/`, but the path is
/// not significant.
///
/// # Protocol
///
/// Text frames are JSON events of the conversational agent protocol, relayed
/// in both directions with light normalization. Binary frames pass through.
pub fn create_relay_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(relay_handler))
        .fallback(relay_handler)
        .layer(TraceLayer::new_for_http())
}
