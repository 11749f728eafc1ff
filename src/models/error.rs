use crate::constants::RETRYABLE_HTTP_STATUSES;
use thiserror::Error;

/// Failure raised while talking to a chain's JSON-RPC node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// No endpoint could be resolved for the chain.
    #[error("RPC endpoint missing. Set {0}")]
    Configuration(String),

    /// The node answered with a JSON-RPC `error` object.
    #[error("RPC error {code}: {message}")]
    Protocol { code: i64, message: String },

    /// The node answered with a non-success HTTP status.
    #[error("HTTP status {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (connect, timeout, body read).
    #[error("connection error: {0}")]
    Connection(String),

    /// The response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// Name of the error class, as reported in degraded payload notes.
    pub fn class(&self) -> &'static str {
        match self {
            RpcError::Configuration(_) => "ConfigurationError",
            RpcError::Protocol { .. } => "ProtocolError",
            RpcError::Http { .. } | RpcError::Connection(_) => "TransportError",
            RpcError::InvalidResponse(_) => "InvalidResponse",
        }
    }

    /// Whether the failure is transient and worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcError::Connection(_) => true,
            RpcError::Http { status, .. } => RETRYABLE_HTTP_STATUSES.contains(status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RpcError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => RpcError::InvalidResponse(err.to_string()),
            None => RpcError::Connection(err.to_string()),
        }
    }
}
