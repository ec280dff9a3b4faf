//! Operator prompt port
//!
//! Used when a model reply only signals insert intent: the missing name and
//! email are asked from the operator directly.
//!
//! - **Port**: [`OperatorPrompt`], defined here
//! - **Adapter**: `ConsoleOperatorPrompt` in the presentation layer

use async_trait::async_trait;

/// Error type for operator prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorPromptError {
    /// Operator declined (empty answer, Ctrl+C, or no prompt available).
    Cancelled,
    /// Input/output error (e.g., terminal read failure).
    IoError(String),
}

impl std::fmt::Display for OperatorPromptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatorPromptError::Cancelled => write!(f, "Operation cancelled"),
            OperatorPromptError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for OperatorPromptError {}

/// Port for asking the operator for a single value.
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    /// Ask for a value labelled `label`. An empty answer is `Cancelled`.
    async fn ask(&self, label: &str) -> Result<String, OperatorPromptError>;
}

/// Non-interactive implementation: every question is declined.
pub struct NoOperatorPrompt;

#[async_trait]
impl OperatorPrompt for NoOperatorPrompt {
    async fn ask(&self, _label: &str) -> Result<String, OperatorPromptError> {
        Err(OperatorPromptError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_operator_prompt_cancels() {
        let result = NoOperatorPrompt.ask("Name").await;
        assert_eq!(result, Err(OperatorPromptError::Cancelled));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            OperatorPromptError::IoError("closed".into()).to_string(),
            "I/O error: closed"
        );
    }
}
