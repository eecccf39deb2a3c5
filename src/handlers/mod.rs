//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `relay` - Browser websocket relayed to the conversational agent

pub mod api;
pub mod relay;

pub use api::health_check;
pub use relay::relay_handler;
