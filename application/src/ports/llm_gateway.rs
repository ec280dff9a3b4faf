//! LLM Gateway port
//!
//! Defines the interface for obtaining a reply from a language model.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
///
/// Every variant is recoverable for the interactive loop: the turn is
/// treated as if no reply was produced.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Timeout")]
    Timeout,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to a model provider.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Model identifier used for requests (for logs and the banner)
    fn model(&self) -> &str;

    /// Send system instructions and the operator's text, return the reply text
    async fn complete(&self, system: &str, user: &str) -> Result<String, GatewayError>;
}
