//! Mock conversational-agent upstream
//!
//! Accepts a single websocket connection, optionally negotiating the `convai`
//! subprotocol, and reports everything it sees on an event channel. Frames
//! queued with [`MockUpstream::send_text`] are written to the relay.

// Not every test uses every helper
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use http::HeaderValue;
use http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

pub const PATH: &str = "/v1/convai/conversation";

/// Something the mock observed on its side of the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamEvent {
    /// Handshake received, with the request path and query
    Connected { uri: String },
    Text(String),
    Binary(Vec<u8>),
    /// The relay closed the socket or the connection dropped
    Closed,
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    events: mpsc::UnboundedReceiver<UpstreamEvent>,
    outgoing: mpsc::UnboundedSender<Message>,
}

impl MockUpstream {
    /// Start a mock that answers with `convai` when the client offers it.
    pub async fn start() -> Self {
        Self::start_with(true).await
    }

    /// Start a mock that never selects a subprotocol.
    pub async fn start_without_subprotocol() -> Self {
        Self::start_with(false).await
    }

    async fn start_with(negotiate: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (event_tx, events) = mpsc::unbounded_channel();
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                let _ = serve_connection(stream, negotiate, event_tx, outgoing_rx).await;
            }
        });

        Self {
            addr,
            events,
            outgoing,
        }
    }

    /// Base websocket URL to configure the relay with
    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, PATH)
    }

    pub fn send_text(&self, text: &str) {
        let _ = self.outgoing.send(Message::text(text.to_string()));
    }

    pub fn send_binary(&self, data: &'static [u8]) {
        let _ = self.outgoing.send(Message::binary(data));
    }

    pub fn close(&self) {
        let _ = self.outgoing.send(Message::Close(None));
    }

    /// Next event, failing the test after five seconds.
    pub async fn next_event(&mut self) -> UpstreamEvent {
        timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("timed out waiting for upstream event")
            .expect("mock upstream stopped")
    }

    /// Next event if one arrives within `wait`.
    pub async fn try_event(&mut self, wait: Duration) -> Option<UpstreamEvent> {
        timeout(wait, self.events.recv()).await.ok().flatten()
    }

    /// Consume the handshake event and return the requested URI.
    pub async fn expect_connected(&mut self) -> String {
        match self.next_event().await {
            UpstreamEvent::Connected { uri } => uri,
            other => panic!("expected handshake, got {other:?}"),
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    negotiate: bool,
    events: mpsc::UnboundedSender<UpstreamEvent>,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let handshake_events = events.clone();
    let callback = move |request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
        let _ = handshake_events.send(UpstreamEvent::Connected {
            uri: request.uri().to_string(),
        });

        let offered = request
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.split(',').any(|p| p.trim() == "convai"));
        if negotiate && offered {
            response
                .headers_mut()
                .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static("convai"));
        }
        Ok(response)
    };

    let ws_stream = accept_hdr_async(stream, callback).await?;
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(UpstreamEvent::Text(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    let _ = events.send(UpstreamEvent::Binary(data.to_vec()));
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    let _ = events.send(UpstreamEvent::Closed);
                    break;
                }
                Some(Ok(_)) => {}
            },
            out = outgoing.recv() => match out {
                Some(message) => write.send(message).await?,
                None => break,
            },
        }
    }

    Ok(())
}
