//! A single relay session.
//!
//! A session is created per accepted downstream socket and walks
//! `Connecting → Relaying → Closing → Closed`. If the upstream cannot be
//! opened it skips straight from `Connecting` to `Closing`, and no frame is
//! relayed in either direction. The browser is watched while the upstream
//! opens: leaving early abandons the attempt, and frames it sends meanwhile
//! are held and relayed first once the upstream is ready. Once relaying, the first pump to stop ends the
//! session and both sockets are closed, except a side that is already gone.

use std::fmt::Display;
use std::time::Duration;

use axum::extract::ws::{Message as DownstreamMessage, WebSocket};
use futures::{Sink, SinkExt, StreamExt, stream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use super::liveness::LivenessState;
use super::pump::{PumpExit, Side, pump_downstream_to_upstream, pump_upstream_to_downstream};
use crate::config::KeepaliveConfig;
use crate::core::upstream::{UpstreamConnector, UpstreamSocket};
use crate::errors::RelayError;

/// Upper bound on sending a close frame to an unresponsive peer
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Relaying,
    Closing,
    Closed,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Connecting, Relaying) | (Connecting, Closing) | (Relaying, Closing) | (Closing, Closed)
        )
    }
}

/// How a session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// The upstream could not be opened; nothing was relayed
    ConnectFailed(RelayError),
    /// The browser left before the upstream was open
    Abandoned,
    /// Relaying started and stopped for this reason
    Relayed(PumpExit),
}

/// Result of waiting for the upstream while watching the browser
enum ConnectOutcome {
    /// Upstream open, with the browser frames received in the meantime
    Ready(UpstreamSocket, Vec<DownstreamMessage>),
    Failed(RelayError),
    Abandoned,
}

pub struct RelaySession {
    id: Uuid,
    state: SessionState,
    liveness: LivenessState,
    keepalive: Option<KeepaliveConfig>,
    cancel: CancellationToken,
}

impl RelaySession {
    /// `cancel` ends the session from outside, typically a child of the
    /// server's shutdown token.
    pub fn new(keepalive: Option<KeepaliveConfig>, cancel: CancellationToken) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Connecting,
            liveness: LivenessState::new(),
            keepalive,
            cancel,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn advance(&mut self, next: SessionState) {
        if !self.state.can_transition_to(next) {
            warn!(from = ?self.state, to = ?next, "Ignoring invalid session transition");
            return;
        }
        debug!(from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }

    /// Relay between `downstream` and a fresh upstream socket until either
    /// side stops or the session is cancelled.
    ///
    /// Never fails: every error is logged here and reported in the returned
    /// [`SessionEnd`].
    pub async fn run(self, downstream: WebSocket, connector: &UpstreamConnector) -> SessionEnd {
        let span = info_span!("relay_session", session_id = %self.id);
        self.drive(downstream, connector).instrument(span).await
    }

    /// Open the upstream, racing cancellation and the browser going away.
    async fn connect(
        &self,
        downstream: &mut WebSocket,
        connector: &UpstreamConnector,
    ) -> ConnectOutcome {
        let connect = connector.connect();
        tokio::pin!(connect);
        let mut pending = Vec::new();

        loop {
            tokio::select! {
                result = &mut connect => {
                    return match result {
                        Ok(upstream) => ConnectOutcome::Ready(upstream, pending),
                        Err(e) => ConnectOutcome::Failed(e),
                    };
                }
                _ = self.cancel.cancelled() => return ConnectOutcome::Failed(RelayError::Cancelled),
                message = downstream.recv() => match message {
                    Some(Ok(DownstreamMessage::Ping(_) | DownstreamMessage::Pong(_))) => {}
                    Some(Ok(DownstreamMessage::Close(_))) | None => return ConnectOutcome::Abandoned,
                    Some(Err(e)) => {
                        debug!("Downstream receive failed while connecting: {}", e);
                        return ConnectOutcome::Abandoned;
                    }
                    Some(Ok(message)) => pending.push(message),
                },
            }
        }
    }

    async fn drive(mut self, mut downstream: WebSocket, connector: &UpstreamConnector) -> SessionEnd {
        info!("Downstream connected");

        let (upstream, pending) = match self.connect(&mut downstream, connector).await {
            ConnectOutcome::Ready(upstream, pending) => (upstream, pending),
            ConnectOutcome::Failed(e) => {
                error!("Upstream connection failed: {}", e);
                self.advance(SessionState::Closing);
                shut(&mut downstream, Side::Downstream, false).await;
                self.advance(SessionState::Closed);
                return SessionEnd::ConnectFailed(e);
            }
            ConnectOutcome::Abandoned => {
                info!("Downstream left before upstream was open");
                self.advance(SessionState::Closing);
                shut(&mut downstream, Side::Downstream, true).await;
                self.advance(SessionState::Closed);
                return SessionEnd::Abandoned;
            }
        };

        self.advance(SessionState::Relaying);
        info!("Relaying");

        if !pending.is_empty() {
            debug!(frames = pending.len(), "Relaying frames held while connecting");
        }
        let (mut downstream_tx, downstream_rx) = downstream.split();
        let mut downstream_rx = stream::iter(pending.into_iter().map(Ok)).chain(downstream_rx);
        let (mut upstream_tx, mut upstream_rx) = upstream.split();

        let exit = tokio::select! {
            exit = pump_downstream_to_upstream(&mut downstream_rx, &mut upstream_tx, &self.liveness) => exit,
            exit = pump_upstream_to_downstream(
                &mut upstream_rx,
                &mut downstream_tx,
                &self.liveness,
                self.keepalive,
            ) => exit,
            _ = self.cancel.cancelled() => PumpExit::Cancelled,
        };

        match &exit {
            PumpExit::KeepaliveTimeout => warn!("Session ending: {}", exit),
            _ => info!("Session ending: {}", exit),
        }

        self.advance(SessionState::Closing);
        let finished = exit.finished_side();
        shut(
            &mut upstream_tx,
            Side::Upstream,
            finished == Some(Side::Upstream),
        )
        .await;
        shut(
            &mut downstream_tx,
            Side::Downstream,
            finished == Some(Side::Downstream),
        )
        .await;
        self.advance(SessionState::Closed);

        info!("Session closed");
        SessionEnd::Relayed(exit)
    }
}

/// Close one side, or only flush it when the peer already went away so a
/// pending close reply still goes out. Errors are expected here and ignored.
async fn shut<K, T>(sink: &mut K, side: Side, already_finished: bool)
where
    K: Sink<T> + Unpin,
    K::Error: Display,
{
    let result = if already_finished {
        timeout(CLOSE_TIMEOUT, sink.flush()).await
    } else {
        timeout(CLOSE_TIMEOUT, sink.close()).await
    };

    match result {
        Ok(Ok(())) => debug!(%side, "Socket closed"),
        Ok(Err(e)) => debug!(%side, "Ignoring close error: {}", e),
        Err(_) => warn!(%side, "Timed out closing socket"),
    }
}
