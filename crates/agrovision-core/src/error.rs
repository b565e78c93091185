//! Client error taxonomy shared by every view model.

use agrovision_gateway::GatewayError;
use thiserror::Error;

/// Fallback shown when the backend rejects a request without a message.
pub const GENERIC_SERVER_MESSAGE: &str = "Something went wrong.";
/// Shown for every connectivity failure.
pub const NETWORK_MESSAGE: &str = "Please check your internet connection.";

/// Failure surfaced to a view.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Input rejected locally; no request was made.
    #[error("{0}")]
    Validation(String),
    /// The backend responded but reported failure.
    #[error(
        "server rejected the request: {}",
        message.as_deref().unwrap_or(GENERIC_SERVER_MESSAGE)
    )]
    Server {
        /// HTTP status of the rejection.
        status: u16,
        /// Backend-supplied message, surfaced verbatim.
        message: Option<String>,
    },
    /// The request went out but no response came back.
    #[error("network failure: {0}")]
    Network(String),
    /// Any other failure constructing, sending or reading a request.
    #[error("{0}")]
    Unknown(String),
}

/// Convenience alias for view-model results.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Construct a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error was raised locally without a request.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Message rendered in the view for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Server { message, .. } => format!(
                "Server Error: {}",
                message.as_deref().unwrap_or(GENERIC_SERVER_MESSAGE)
            ),
            Self::Network(_) => format!("Network Error: {NETWORK_MESSAGE}"),
            Self::Unknown(message) => format!("Error: {message}"),
        }
    }
}

impl From<GatewayError> for ClientError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::Server { status, message } => Self::Server { status, message },
            GatewayError::Network { message } => Self::Network(message),
            GatewayError::Unknown { message } => Self::Unknown(message),
        }
    }
}
