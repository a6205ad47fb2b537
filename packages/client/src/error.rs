//! Error types for the client session manager.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Send attempted while the session is not open
    #[error("cannot send message, not connected")]
    NotConnected,

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Every reconnection attempt failed
    #[error("connection lost, could not reconnect after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    /// Origin is neither http(s) nor ws(s)
    #[error("Invalid origin '{0}': expected http://, https://, ws:// or wss://")]
    InvalidOrigin(String),

    /// Envelope could not be serialized
    #[error("Failed to encode envelope: {0}")]
    EncodeFailed(String),
}
