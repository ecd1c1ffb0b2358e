//! Error types for the negotiation API client

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ClientError>;

/// Every way a call to the gateway can fail
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection failure, timeout, or an unreadable response body
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-2xx status
    #[error("Gateway returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Build a status error from a raw response body.
    ///
    /// The deployed handlers answer failures with a JSON string such as
    /// `"Error: 'user_id' and 'product_id' are required."`; that string is
    /// unwrapped, anything else is kept verbatim.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = match serde_json::from_slice::<String>(body) {
            Ok(message) => message,
            Err(_) => String::from_utf8_lossy(body).trim().to_string(),
        };
        ClientError::Status { status, message }
    }

    /// HTTP status carried by the error, if the gateway answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_timeout())
    }
}
