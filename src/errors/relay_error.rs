//! Errors raised while establishing or running a relay session.
//!
//! None of these errors ever leave a session: they are logged at the session
//! boundary and the session shuts down both sockets.

use thiserror::Error;

/// Errors that can occur while connecting upstream or relaying.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A private agent was configured without the credential it needs
    #[error("Private agent requires an API key")]
    MissingApiKey,

    /// The signed-URL request could not be sent or its body could not be read
    #[error("Signed URL request failed: {0}")]
    SignedUrlRequest(String),

    /// The signed-URL endpoint answered with a non-success status
    #[error("Signed URL request rejected with status {status}")]
    SignedUrlRejected { status: u16 },

    /// The signed-URL response body did not carry a usable `signed_url`
    #[error("Invalid signed URL response: {0}")]
    InvalidSignedUrlResponse(String),

    /// The resolved upstream URL could not be parsed
    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    /// The upstream websocket handshake failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The upstream accepted the socket without the required subprotocol
    #[error("Upstream did not negotiate the '{0}' subprotocol")]
    SubprotocolNotNegotiated(&'static str),

    /// An operation exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The owning session or the server was shut down
    #[error("Cancelled")]
    Cancelled,
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout(format!("signed URL request: {err}"))
        } else {
            RelayError::SignedUrlRequest(err.without_url().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            RelayError::SignedUrlRejected { status: 401 }.to_string(),
            "Signed URL request rejected with status 401"
        );
        assert_eq!(
            RelayError::SubprotocolNotNegotiated("convai").to_string(),
            "Upstream did not negotiate the 'convai' subprotocol"
        );
        assert_eq!(RelayError::Cancelled.to_string(), "Cancelled");
        assert_eq!(
            RelayError::MissingApiKey.to_string(),
            "Private agent requires an API key"
        );
    }
}
