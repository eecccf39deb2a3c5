//! Post-receive hook for upstream frames.
//!
//! Every upstream frame is inspected for a liveness check so the session can
//! later repair the browser's reply. This runs independently of
//! [`upstream_to_downstream`](super::upstream_to_downstream): a frame the
//! mapping passes through or rewrites is observed all the same.

use serde_json::Value;

use super::messages::TYPE_PING;

/// A liveness check seen on the upstream socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingObservation {
    /// `ping_event.event_id` when it is an integer
    pub event_id: Option<i64>,
}

/// Inspect one upstream text frame for a `ping`.
///
/// Best effort: frames that do not parse, are not pings, or carry no
/// `ping_event` object yield `None` and leave the session state alone.
pub fn observe_ping(raw: &str) -> Option<PingObservation> {
    let msg: Value = serde_json::from_str(raw).ok()?;
    if msg.get("type").and_then(Value::as_str) != Some(TYPE_PING) {
        return None;
    }

    let event = msg.get("ping_event")?.as_object()?;
    Some(PingObservation {
        event_id: event.get("event_id").and_then(Value::as_i64),
    })
}
