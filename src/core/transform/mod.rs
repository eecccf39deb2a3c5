//! Message transformer.
//!
//! Maps each text frame between the shape the upstream conversational service
//! emits and the shape the browser client expects, in both directions.
//!
//! # Upstream → Downstream
//!
//! - **audio**: re-emitted with only `audio_event.audio_base_64`; dropped when that is missing
//! - **agent_response**: `agent_response_event.agent_response` defaulted to `""`
//! - **ping**: `ping_event.event_id` forwarded as-is
//! - **conversation_initiation_metadata**: event object defaulted to `{}`
//! - **interruption**: reduced to `{"type":"interruption"}`
//! - anything else: forwarded unchanged
//!
//! # Downstream → Upstream
//!
//! - **pong**: `event_id` coerced to an integer (see [`downstream`])
//! - anything else: forwarded unchanged
//!
//! Parse failures never drop a frame and never end a session: the original
//! text is forwarded instead.
//!
//! The ping observer in [`observer`] is kept apart from the mapping so both
//! mappings stay free of session state.

pub mod downstream;
pub mod messages;
pub mod observer;
pub mod upstream;

pub use downstream::downstream_to_upstream;
pub use observer::{PingObservation, observe_ping};
pub use upstream::upstream_to_downstream;
