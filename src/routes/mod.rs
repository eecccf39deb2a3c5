pub mod api;
pub mod relay;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// All routes of the server, health first and the relay catching the rest
pub fn create_router() -> Router<Arc<AppState>> {
    api::create_api_router().merge(relay::create_relay_router())
}
