//! Downstream → upstream mapping.
//!
//! Everything the browser sends goes upstream untouched except `pong`, whose
//! `event_id` must reach the upstream service as an integer. Browsers have
//! been seen replying with:
//!
//! - the integer itself (kept)
//! - a numeric string such as `"42"` (parsed)
//! - the literal `"ping"` (replaced by the last id seen on an upstream ping)
//!
//! When none of these yields an integer the original frame is forwarded as-is
//! and the discrepancy is logged.

use std::borrow::Cow;

use serde_json::Value;
use tracing::{debug, error, warn};

use super::messages::{
    PING_PLACEHOLDER, Pong, TYPE_CONVERSATION_INITIATION_CLIENT_DATA, TYPE_PONG, USER_AUDIO_CHUNK,
};

/// Map one downstream text frame to the frame the upstream should receive.
///
/// `last_ping_id` is the session's most recently observed upstream ping id.
pub fn downstream_to_upstream(raw: &str, last_ping_id: Option<i64>) -> Cow<'_, str> {
    let msg = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(msg)) => msg,
        Ok(_) => return Cow::Borrowed(raw),
        Err(e) => {
            error!("Error transforming downstream message: {}", e);
            return Cow::Borrowed(raw);
        }
    };

    let msg_type = msg.get("type").and_then(Value::as_str).unwrap_or("unknown");
    debug!("Downstream → Upstream: {}", msg_type);

    if msg_type == TYPE_CONVERSATION_INITIATION_CLIENT_DATA {
        return Cow::Borrowed(raw);
    }

    if let Some(chunk) = msg.get(USER_AUDIO_CHUNK) {
        debug!(
            chunk_chars = chunk.as_str().map_or(0, str::len),
            "Audio chunk"
        );
        return Cow::Borrowed(raw);
    }

    if msg_type != TYPE_PONG {
        return Cow::Borrowed(raw);
    }

    let event_id = match resolve_event_id(msg.get("event_id"), last_ping_id) {
        Ok(id) => id,
        Err(reason) => {
            warn!("Forwarding pong unchanged: {}", reason);
            return Cow::Borrowed(raw);
        }
    };

    match serde_json::to_string(&Pong { event_id }) {
        Ok(json) => Cow::Owned(json),
        Err(e) => {
            error!("Failed to serialize pong: {}", e);
            Cow::Borrowed(raw)
        }
    }
}

/// Coerce a pong `event_id` into the integer the upstream expects.
fn resolve_event_id(event_id: Option<&Value>, last_ping_id: Option<i64>) -> Result<i64, String> {
    match event_id {
        Some(Value::String(s)) if s == PING_PLACEHOLDER => {
            last_ping_id.ok_or_else(|| "event_id 'ping' but no ping id seen yet".to_string())
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("cannot convert event_id '{s}' to integer")),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| format!("event_id must be integer, got: {n}")),
        Some(other) => Err(format!("event_id must be integer, got: {other}")),
        None => Err("event_id missing".to_string()),
    }
}
