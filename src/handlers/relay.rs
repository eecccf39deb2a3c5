//! Relay WebSocket handler
//!
//! Accepts a browser websocket that offers the `convai` subprotocol and hands
//! it to a fresh [`RelaySession`]. The path is not inspected.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::SEC_WEBSOCKET_PROTOCOL},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::core::relay::{RelaySession, SessionEnd};
use crate::core::upstream::CONVAI_SUBPROTOCOL;
use crate::state::AppState;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Relay WebSocket handler
///
/// Rejects the upgrade with `400 Bad Request` when the client does not offer
/// the `convai` subprotocol; otherwise negotiates it and starts a session.
pub async fn relay_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    if !offers_subprotocol(&headers, CONVAI_SUBPROTOCOL) {
        warn!("Rejecting websocket without '{}' subprotocol", CONVAI_SUBPROTOCOL);
        return (
            StatusCode::BAD_REQUEST,
            format!("websocket subprotocol '{CONVAI_SUBPROTOCOL}' required"),
        )
            .into_response();
    }

    debug!("Relay WebSocket upgrade requested");

    ws.protocols([CONVAI_SUBPROTOCOL])
        .max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_failed_upgrade(|e| warn!("Relay WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_relay_socket(socket, state))
}

async fn handle_relay_socket(socket: WebSocket, state: Arc<AppState>) {
    let session = RelaySession::new(state.config.keepalive(), state.shutdown.child_token());
    let session_id = session.id();

    match session.run(socket, &state.connector).await {
        SessionEnd::ConnectFailed(e) => {
            info!(%session_id, "Session ended before relaying: {}", e)
        }
        SessionEnd::Abandoned => debug!(%session_id, "Session abandoned while connecting"),
        SessionEnd::Relayed(exit) => debug!(%session_id, "Session finished: {}", exit),
    }
}

fn offers_subprotocol(headers: &HeaderMap, protocol: &str) -> bool {
    headers
        .get_all(SEC_WEBSOCKET_PROTOCOL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|offered| offered.trim() == protocol)
}
