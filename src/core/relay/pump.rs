//! The two directional pumps of a relay session.
//!
//! Each pump owns one read half and the opposite write half. Text frames go
//! through the message transformer; binary frames are forwarded untouched;
//! websocket control frames are consumed locally. A pump returns the first
//! time its direction can make no further progress, and the session tears the
//! pair down from there.

use std::fmt::{self, Display};

use axum::extract::ws::Message as DownstreamMessage;
use bytes::Bytes;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until};
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use tracing::{debug, info};

use super::liveness::LivenessState;
use crate::config::KeepaliveConfig;
use crate::core::transform::{downstream_to_upstream, observe_ping, upstream_to_downstream};

/// One end of the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The browser client
    Downstream,
    /// The conversational agent service
    Upstream,
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Downstream => f.write_str("downstream"),
            Side::Upstream => f.write_str("upstream"),
        }
    }
}

/// Why a pump (or the pair) stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// The peer closed its socket or its stream ended
    PeerClosed(Side),
    /// Reading from the side failed
    ReceiveFailed { side: Side, error: String },
    /// Writing to the side failed
    SendFailed { side: Side, error: String },
    /// The browser did not answer a websocket Ping in time
    KeepaliveTimeout,
    /// The session was cancelled from outside
    Cancelled,
}

impl PumpExit {
    /// The side that is already gone and must not be closed again.
    pub fn finished_side(&self) -> Option<Side> {
        match self {
            PumpExit::PeerClosed(side)
            | PumpExit::ReceiveFailed { side, .. }
            | PumpExit::SendFailed { side, .. } => Some(*side),
            PumpExit::KeepaliveTimeout | PumpExit::Cancelled => None,
        }
    }
}

impl Display for PumpExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PumpExit::PeerClosed(side) => write!(f, "{side} closed"),
            PumpExit::ReceiveFailed { side, error } => write!(f, "{side} receive failed: {error}"),
            PumpExit::SendFailed { side, error } => write!(f, "{side} send failed: {error}"),
            PumpExit::KeepaliveTimeout => f.write_str("downstream keepalive timed out"),
            PumpExit::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Forward browser frames to the upstream socket.
///
/// `pong` replies are repaired with the last ping id in `liveness`. A
/// websocket Pong from the browser satisfies the pending keepalive probe.
pub async fn pump_downstream_to_upstream<S, E, K>(
    source: &mut S,
    sink: &mut K,
    liveness: &LivenessState,
) -> PumpExit
where
    S: Stream<Item = Result<DownstreamMessage, E>> + Unpin,
    E: Display,
    K: Sink<UpstreamMessage> + Unpin,
    K::Error: Display,
{
    loop {
        let message = match source.next().await {
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                return PumpExit::ReceiveFailed {
                    side: Side::Downstream,
                    error: e.to_string(),
                };
            }
            None => return PumpExit::PeerClosed(Side::Downstream),
        };

        let outgoing = match message {
            DownstreamMessage::Text(text) => {
                let forwarded = downstream_to_upstream(text.as_str(), liveness.last_ping_id());
                UpstreamMessage::text(forwarded.into_owned())
            }
            DownstreamMessage::Binary(data) => UpstreamMessage::Binary(data),
            DownstreamMessage::Pong(_) => {
                liveness.pong_received();
                continue;
            }
            DownstreamMessage::Ping(_) => continue,
            DownstreamMessage::Close(frame) => {
                debug!(?frame, "Downstream sent close");
                return PumpExit::PeerClosed(Side::Downstream);
            }
        };

        if let Err(e) = sink.send(outgoing).await {
            return PumpExit::SendFailed {
                side: Side::Upstream,
                error: e.to_string(),
            };
        }
    }
}

/// Forward upstream frames to the browser.
///
/// Every text frame is offered to the ping observer before it is transformed.
/// With `keepalive` set this pump also probes the browser with websocket Pings
/// and gives up when one goes unanswered past the timeout.
pub async fn pump_upstream_to_downstream<S, E, K>(
    source: &mut S,
    sink: &mut K,
    liveness: &LivenessState,
    keepalive: Option<KeepaliveConfig>,
) -> PumpExit
where
    S: Stream<Item = Result<UpstreamMessage, E>> + Unpin,
    E: Display,
    K: Sink<DownstreamMessage> + Unpin,
    K::Error: Display,
{
    let mut ticker = keepalive.map(|keepalive| {
        let mut ticker = interval_at(Instant::now() + keepalive.interval, keepalive.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });
    let mut pong_deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            message = source.next() => {
                let message = match message {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        return PumpExit::ReceiveFailed {
                            side: Side::Upstream,
                            error: e.to_string(),
                        };
                    }
                    None => return PumpExit::PeerClosed(Side::Upstream),
                };

                let outgoing = match message {
                    UpstreamMessage::Text(text) => {
                        if let Some(observation) = observe_ping(text.as_str()) {
                            debug!(event_id = ?observation.event_id, "Stored ping event_id");
                            liveness.record_ping(observation);
                        }
                        match upstream_to_downstream(text.as_str()) {
                            Some(forwarded) => DownstreamMessage::text(forwarded.into_owned()),
                            None => continue,
                        }
                    }
                    UpstreamMessage::Binary(data) => DownstreamMessage::Binary(data),
                    UpstreamMessage::Close(frame) => {
                        debug!(?frame, "Upstream sent close");
                        return PumpExit::PeerClosed(Side::Upstream);
                    }
                    UpstreamMessage::Ping(_) | UpstreamMessage::Pong(_) | UpstreamMessage::Frame(_) => {
                        continue;
                    }
                };

                if let Err(e) = sink.send(outgoing).await {
                    return PumpExit::SendFailed {
                        side: Side::Downstream,
                        error: e.to_string(),
                    };
                }
            }

            _ = next_tick(&mut ticker) => {
                if liveness.awaiting_pong() {
                    continue;
                }
                liveness.ping_sent();
                if let Err(e) = sink.send(DownstreamMessage::Ping(Bytes::new())).await {
                    return PumpExit::SendFailed {
                        side: Side::Downstream,
                        error: e.to_string(),
                    };
                }
                pong_deadline = keepalive.map(|keepalive| Instant::now() + keepalive.timeout);
            }

            _ = wait_until(pong_deadline) => {
                pong_deadline = None;
                if liveness.awaiting_pong() {
                    info!("Downstream did not answer keepalive ping");
                    return PumpExit::KeepaliveTimeout;
                }
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
