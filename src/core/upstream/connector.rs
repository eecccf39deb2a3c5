//! Upstream connection establishment.
//!
//! # Flow
//!
//! - Public agent: `wss://…/conversation?agent_id=<id>`, no credential sent.
//! - Private agent: `GET <signed-url endpoint>?agent_id=<id>` with the API key
//!   header, bounded by a timeout. Any non-2xx answer fails the attempt. The
//!   `signed_url` field of the JSON body is the socket URL.
//!
//! Either way the socket is opened with the `convai` subprotocol, and an
//! upstream that does not echo it back is rejected. There is exactly one
//! attempt per session; the session decides what a failure means.

use std::time::Duration;

use http::HeaderValue;
use http::header::SEC_WEBSOCKET_PROTOCOL;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};
use url::Url;
use zeroize::Zeroizing;

use super::config::{AGENT_ID_PARAM, API_KEY_HEADER, CONVAI_SUBPROTOCOL};
use crate::config::RelayConfig;
use crate::errors::{RelayError, RelayResult};

/// An open upstream websocket.
pub type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Credentials and endpoint for the signed-URL exchange
struct PrivateAgent {
    api_key: Zeroizing<String>,
    signed_url_endpoint: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    signed_url: String,
}

/// Produces one ready upstream socket per call.
///
/// Built once from the immutable configuration and shared by all sessions.
pub struct UpstreamConnector {
    http: reqwest::Client,
    agent_id: String,
    ws_url: String,
    private: Option<PrivateAgent>,
    signed_url_timeout: Duration,
    connect_timeout: Duration,
}

impl UpstreamConnector {
    pub fn new(config: &RelayConfig) -> RelayResult<Self> {
        let private = if config.agent_private {
            let api_key = config.api_key.clone().ok_or(RelayError::MissingApiKey)?;
            Some(PrivateAgent {
                api_key: Zeroizing::new(api_key),
                signed_url_endpoint: config.signed_url_endpoint.clone(),
            })
        } else {
            None
        };

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RelayError::SignedUrlRequest(e.to_string()))?;

        Ok(Self {
            http,
            agent_id: config.agent_id.clone(),
            ws_url: config.upstream_ws_url.clone(),
            private,
            signed_url_timeout: config.signed_url_timeout(),
            connect_timeout: config.upstream_connect_timeout(),
        })
    }

    /// Whether sessions go through the signed-URL exchange.
    pub fn is_private(&self) -> bool {
        self.private.is_some()
    }

    /// Public endpoint with the agent id embedded as a query parameter.
    pub fn public_url(&self) -> RelayResult<Url> {
        let mut url =
            Url::parse(&self.ws_url).map_err(|e| RelayError::InvalidUpstreamUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair(AGENT_ID_PARAM, &self.agent_id);
        Ok(url)
    }

    /// Resolve the URL the upstream socket should be opened at.
    pub async fn resolve_url(&self) -> RelayResult<Url> {
        match &self.private {
            None => self.public_url(),
            Some(private) => {
                let signed = self.fetch_signed_url(private).await?;
                Url::parse(&signed).map_err(|e| RelayError::InvalidUpstreamUrl(e.to_string()))
            }
        }
    }

    async fn fetch_signed_url(&self, private: &PrivateAgent) -> RelayResult<String> {
        debug!(
            endpoint = %private.signed_url_endpoint,
            "Requesting signed upstream URL"
        );

        let response = self
            .http
            .get(&private.signed_url_endpoint)
            .query(&[(AGENT_ID_PARAM, self.agent_id.as_str())])
            .header(API_KEY_HEADER, private.api_key.as_str())
            .timeout(self.signed_url_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::SignedUrlRejected {
                status: status.as_u16(),
            });
        }

        let body: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| RelayError::InvalidSignedUrlResponse(e.without_url().to_string()))?;

        if body.signed_url.trim().is_empty() {
            return Err(RelayError::InvalidSignedUrlResponse(
                "empty signed_url".to_string(),
            ));
        }

        Ok(body.signed_url)
    }

    /// Open the upstream socket.
    ///
    /// # Errors
    ///
    /// Fails when the signed-URL exchange fails, when the handshake fails or
    /// exceeds the connect timeout, or when the upstream does not negotiate
    /// the `convai` subprotocol.
    pub async fn connect(&self) -> RelayResult<UpstreamSocket> {
        let url = self.resolve_url().await?;
        let display_url = redact_url(&url);

        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| RelayError::InvalidUpstreamUrl(e.to_string()))?;
        request.headers_mut().insert(
            SEC_WEBSOCKET_PROTOCOL,
            HeaderValue::from_static(CONVAI_SUBPROTOCOL),
        );

        debug!(url = %display_url, "Connecting upstream");

        let (socket, response) = match timeout(self.connect_timeout, connect_async(request)).await
        {
            Ok(Ok(connected)) => connected,
            Ok(Err(e)) => return Err(RelayError::ConnectionFailed(e.to_string())),
            Err(_) => {
                return Err(RelayError::Timeout(format!(
                    "upstream handshake with {display_url}"
                )));
            }
        };

        let negotiated = response
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.split(',').any(|p| p.trim() == CONVAI_SUBPROTOCOL));
        if !negotiated {
            return Err(RelayError::SubprotocolNotNegotiated(CONVAI_SUBPROTOCOL));
        }

        info!(url = %display_url, "Upstream socket open");
        Ok(socket)
    }
}

/// URL without its query string, safe to log (signed URLs carry a token there).
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    redacted.set_query(None);
    redacted.to_string()
}
