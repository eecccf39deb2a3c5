//! Wire shapes produced by the transformer.
//!
//! Only outgoing shapes are typed. Incoming frames are inspected as
//! `serde_json::Value` so that anything unexpected can be passed through
//! byte for byte.

use serde::Serialize;
use serde_json::Value;

// =============================================================================
// Message types
// =============================================================================

pub const TYPE_AUDIO: &str = "audio";
pub const TYPE_AGENT_RESPONSE: &str = "agent_response";
pub const TYPE_PING: &str = "ping";
pub const TYPE_PONG: &str = "pong";
pub const TYPE_CONVERSATION_INITIATION_METADATA: &str = "conversation_initiation_metadata";
pub const TYPE_CONVERSATION_INITIATION_CLIENT_DATA: &str = "conversation_initiation_client_data";
pub const TYPE_INTERRUPTION: &str = "interruption";

/// Field marking a downstream audio chunk (these frames carry no `type`).
pub const USER_AUDIO_CHUNK: &str = "user_audio_chunk";

/// Literal some clients send back as the pong `event_id` instead of the number.
pub const PING_PLACEHOLDER: &str = "ping";

// =============================================================================
// Upstream -> Downstream
// =============================================================================

/// Normalized messages sent to the browser client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownstreamEvent {
    /// Synthesized speech chunk
    Audio { audio_event: AudioEvent },

    /// Agent text response
    AgentResponse {
        agent_response_event: AgentResponseEvent,
    },

    /// Liveness check the client must answer with a pong
    Ping { ping_event: PingEvent },

    /// Conversation metadata sent once at the start
    ConversationInitiationMetadata {
        conversation_initiation_metadata_event: Value,
    },

    /// User barged in; client should stop playback
    Interruption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioEvent {
    pub audio_base_64: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponseEvent {
    pub agent_response: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingEvent {
    pub event_id: Value,
}

// =============================================================================
// Downstream -> Upstream
// =============================================================================

/// Corrected liveness reply sent upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "pong")]
pub struct Pong {
    pub event_id: i64,
}
