//! Upstream connector.
//!
//! Opens the persistent websocket to the conversational-AI service, going
//! through the signed-URL exchange first when the agent is private.

mod config;
mod connector;

pub use config::{
    AGENT_ID_PARAM, API_KEY_HEADER, CONVAI_SUBPROTOCOL, ELEVENLABS_CONVAI_WS_URL,
    ELEVENLABS_SIGNED_URL_ENDPOINT,
};
pub use connector::{UpstreamConnector, UpstreamSocket, redact_url};
