//! Gateway failure taxonomy and classification of `reqwest` outcomes.
//!
//! # Design
//! - `Server`: a response arrived with a non-success status.
//! - `Network`: the request went out but no response came back.
//! - `Unknown`: building the request or reading the reply failed.

use agrovision_api_models::ServerMessage;
use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Errors raised by gateway calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend responded but reported failure.
    #[error("request rejected with status {status}")]
    Server {
        /// HTTP status code of the response.
        status: u16,
        /// Message supplied by the backend, when non-blank.
        message: Option<String>,
    },
    /// No response was received.
    #[error("network failure: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },
    /// Any other failure building the request or reading the response.
    #[error("{message}")]
    Unknown {
        /// Underlying failure description.
        message: String,
    },
}

/// Convenience alias for gateway results.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// Construct an [`GatewayError::Unknown`] from any displayable message.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Construct a [`GatewayError::Network`] from any displayable message.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// HTTP status for server failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Network { .. } | Self::Unknown { .. } => None,
        }
    }

    /// Whether the failure happened before any response arrived.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub(crate) fn decode(err: &serde_json::Error) -> Self {
        Self::unknown(format!("invalid response body: {err}"))
    }
}

/// Convert a non-success response into a [`GatewayError::Server`].
pub(crate) async fn classify_response(response: Response) -> GatewayError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    server_error(status, &body)
}

/// Build a server error, lifting a non-blank JSON `message` field from the body.
pub(crate) fn server_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let message = serde_json::from_slice::<ServerMessage>(body)
        .ok()
        .and_then(|payload| payload.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty());
    GatewayError::Server {
        status: status.as_u16(),
        message,
    }
}

/// Classify a `reqwest` failure raised before a usable response existed.
pub(crate) fn classify_transport(err: &reqwest::Error) -> GatewayError {
    if err.is_builder() || err.is_decode() {
        GatewayError::unknown(err.to_string())
    } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
        GatewayError::network(err.to_string())
    } else {
        GatewayError::unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_lifts_message_field() {
        let err = server_error(
            StatusCode::UNAUTHORIZED,
            br#"{"message":"Invalid password"}"#,
        );
        assert_eq!(
            err,
            GatewayError::Server {
                status: 401,
                message: Some("Invalid password".to_string()),
            }
        );
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn server_error_without_usable_message() {
        for body in [&b""[..], b"<html>oops</html>", br#"{"message":"   "}"#, br#"{"error":"x"}"#] {
            let err = server_error(StatusCode::INTERNAL_SERVER_ERROR, body);
            assert_eq!(
                err,
                GatewayError::Server {
                    status: 500,
                    message: None,
                }
            );
        }
    }

    #[test]
    fn helpers_build_expected_variants() {
        assert!(GatewayError::network("refused").is_network());
        assert!(!GatewayError::unknown("bad url").is_network());
        assert_eq!(GatewayError::unknown("bad url").to_string(), "bad url");
        assert_eq!(GatewayError::network("refused").status(), None);
    }
}
