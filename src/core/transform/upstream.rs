//! Upstream → downstream mapping.

use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::{debug, error};

use super::messages::{
    AgentResponseEvent, AudioEvent, DownstreamEvent, PingEvent, TYPE_AGENT_RESPONSE, TYPE_AUDIO,
    TYPE_CONVERSATION_INITIATION_METADATA, TYPE_INTERRUPTION, TYPE_PING,
};

/// What to do with one upstream frame
enum Mapping {
    /// Send this normalized event instead of the original
    Emit(DownstreamEvent),
    /// Send the original text unchanged
    Passthrough,
    /// Send nothing
    Drop,
}

/// Map one upstream text frame to the frame the browser should receive.
///
/// Returns `None` when the frame must be dropped (audio without payload).
/// Anything that cannot be parsed or normalized comes back unchanged.
pub fn upstream_to_downstream(raw: &str) -> Option<Cow<'_, str>> {
    let msg = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(msg)) => msg,
        Ok(_) => {
            debug!("Passthrough: upstream frame is not a JSON object");
            return Some(Cow::Borrowed(raw));
        }
        Err(e) => {
            error!("Error transforming upstream message: {}", e);
            return Some(Cow::Borrowed(raw));
        }
    };

    let msg_type = msg.get("type").and_then(Value::as_str).unwrap_or("unknown");
    debug!("Upstream → Downstream: {}", msg_type);

    match map_event(msg_type, &msg) {
        Mapping::Emit(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Cow::Owned(json)),
            Err(e) => {
                error!("Failed to serialize downstream event: {}", e);
                Some(Cow::Borrowed(raw))
            }
        },
        Mapping::Passthrough => {
            debug!("Passthrough: {}", msg_type);
            Some(Cow::Borrowed(raw))
        }
        Mapping::Drop => {
            debug!("Dropping {} frame without payload", msg_type);
            None
        }
    }
}

fn map_event(msg_type: &str, msg: &Map<String, Value>) -> Mapping {
    match msg_type {
        TYPE_AUDIO => match msg.get("audio_event") {
            None | Some(Value::Null) => Mapping::Drop,
            Some(Value::Object(event)) => match event.get("audio_base_64") {
                Some(Value::String(audio)) if !audio.is_empty() => {
                    Mapping::Emit(DownstreamEvent::Audio {
                        audio_event: AudioEvent {
                            audio_base_64: audio.clone(),
                        },
                    })
                }
                _ => Mapping::Drop,
            },
            Some(_) => Mapping::Passthrough,
        },

        TYPE_AGENT_RESPONSE => match msg.get("agent_response_event") {
            Some(Value::Object(event)) => Mapping::Emit(DownstreamEvent::AgentResponse {
                agent_response_event: AgentResponseEvent {
                    agent_response: event
                        .get("agent_response")
                        .cloned()
                        .unwrap_or_else(|| Value::String(String::new())),
                },
            }),
            _ => Mapping::Passthrough,
        },

        TYPE_PING => match msg.get("ping_event") {
            Some(Value::Object(event)) => Mapping::Emit(DownstreamEvent::Ping {
                ping_event: PingEvent {
                    event_id: event.get("event_id").cloned().unwrap_or(Value::Null),
                },
            }),
            _ => Mapping::Passthrough,
        },

        TYPE_CONVERSATION_INITIATION_METADATA => {
            Mapping::Emit(DownstreamEvent::ConversationInitiationMetadata {
                conversation_initiation_metadata_event: msg
                    .get("conversation_initiation_metadata_event")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
            })
        }

        TYPE_INTERRUPTION => Mapping::Emit(DownstreamEvent::Interruption),

        _ => Mapping::Passthrough,
    }
}
