//! Gateway error type.

use coursehub_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Failure talking to the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway answered with a non-2xx status.
    #[error("gateway returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// The gateway's `message`, or the raw body when none was given.
        message: String,
    },
    /// The gateway answered 2xx with `status: false`.
    #[error("gateway rejected the request: {message}")]
    Rejected {
        /// The gateway's `message`.
        message: String,
    },
    /// The call did not finish within the configured timeout.
    #[error("gateway call timed out")]
    Timeout,
    /// Connection or protocol failure.
    #[error("gateway transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// The body could not be decoded.
    #[error("unexpected gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// The gateway's own message, when it sent one.
    pub fn gateway_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } | Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let message = match err.gateway_message() {
            Some(msg) => format!("Payment gateway error: {msg}"),
            None => "Payment gateway is unavailable".to_string(),
        };
        AppError::with_source(ErrorKind::ExternalService, message, err)
    }
}
