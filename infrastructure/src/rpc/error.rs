//! Error types for the tool session transport

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while talking to a tool server
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to spawn tool server: {0}")]
    SpawnError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl SessionError {
    /// Whether the channel itself is gone (as opposed to one bad message)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SessionError::TransportClosed | SessionError::Io(_) | SessionError::Timeout(_)
        )
    }
}
