//! Error types for the Sydia domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Every gateway call
//! returns a [`GatewayError`] on failure; errors never outlive the call
//! that produced them.

use thiserror::Error;

/// The top-level error type for Sydia operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Terminal or file I/O in the binaries.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of a single gateway operation (chat, stream, embed).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The configured provider name is not one of the supported providers.
    #[error("Unsupported provider: {0}")]
    Configuration(String),

    /// The provider answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// The provider answered 2xx without the body the call needed.
    #[error("Empty response body from {provider}")]
    EmptyBody { provider: String },

    /// Connection-level failure before a response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// Connect or read timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The body stream failed after streaming began.
    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    /// Malformed JSON in a non-streaming response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("{operation} is not supported by provider {provider}")]
    UnsupportedOperation { operation: String, provider: String },
}

impl GatewayError {
    /// True for every failure that originated on the wire (status, empty
    /// body, network, timeout, interrupted stream).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::EmptyBody { .. }
                | Self::Network(_)
                | Self::Timeout(_)
                | Self::StreamInterrupted(_)
        )
    }

    /// HTTP status code, when the provider returned one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),
}
