//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown model provider: {0} (expected one of: ollama, openai, anthropic, gemini, replicate)")]
    UnknownProvider(String),

    #[error("Invalid tool argument '{key}': {reason}")]
    InvalidArgument { key: String, reason: String },
}
