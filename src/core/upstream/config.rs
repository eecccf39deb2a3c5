//! Upstream service endpoints and protocol constants.

/// Public conversational-AI websocket endpoint; the agent id goes in the query.
pub const ELEVENLABS_CONVAI_WS_URL: &str = "wss://api.elevenlabs.io/v1/convai/conversation";

/// Endpoint exchanging an agent id for a one-time signed websocket URL.
pub const ELEVENLABS_SIGNED_URL_ENDPOINT: &str =
    "https://api.elevenlabs.io/v1/convai/conversation/get-signed-url";

/// Websocket subprotocol required on both the upstream and downstream sockets.
pub const CONVAI_SUBPROTOCOL: &str = "convai";

/// Header carrying the API key on the signed-URL request.
pub const API_KEY_HEADER: &str = "xi-api-key";

/// Query parameter carrying the agent id.
pub const AGENT_ID_PARAM: &str = "agent_id";
