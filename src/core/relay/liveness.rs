//! Per-session liveness state shared by the two pumps.
//!
//! Two independent pieces live here:
//!
//! - the id of the most recent upstream `ping`, written by the
//!   upstream → downstream pump and read by the downstream → upstream pump to
//!   repair `pong` replies
//! - whether a websocket Ping sent to the browser is still unanswered
//!
//! Both are plain last-write-wins cells. A read racing a write sees either the
//! old or the new value, which is all the pong repair needs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;

use crate::core::transform::PingObservation;

#[derive(Debug, Default)]
pub struct LivenessState {
    last_ping_id: ArcSwapOption<i64>,
    awaiting_pong: AtomicBool,
}

impl LivenessState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored ping id with the one just observed.
    pub fn record_ping(&self, observation: PingObservation) {
        self.last_ping_id.store(observation.event_id.map(Arc::new));
    }

    /// Most recently observed upstream ping id, if any.
    pub fn last_ping_id(&self) -> Option<i64> {
        self.last_ping_id.load_full().map(|id| *id)
    }

    pub(crate) fn ping_sent(&self) {
        self.awaiting_pong.store(true, Ordering::Release);
    }

    pub(crate) fn pong_received(&self) {
        self.awaiting_pong.store(false, Ordering::Release);
    }

    pub(crate) fn awaiting_pong(&self) -> bool {
        self.awaiting_pong.load(Ordering::Acquire)
    }
}
