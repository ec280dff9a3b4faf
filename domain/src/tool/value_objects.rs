//! Tool domain value objects: immutable result and error types
//!
//! Every invocation produces exactly one [`ToolResult`]: either a display
//! string or a [`ToolError`] tagged with a [`FailureKind`]. The kind is what
//! the interactive loop uses to decide how loudly to report a failure:
//!
//! | Kind | Raised by | Meaning |
//! |------|-----------|---------|
//! | `Validation` | dispatcher | Unknown tool, bad arguments, bad table name |
//! | `Constraint` | store gateway | Expected rejection (duplicate email) |
//! | `StoreUnavailable` | store gateway | Could not connect to the store |
//! | `Store` | store gateway / dispatcher | Any other store or handler failure |
//! | `Transport` | session channel | Tool process gone, channel closed, timeout |

use serde::{Deserialize, Serialize};

/// Classification of a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Constraint,
    StoreUnavailable,
    Store,
    Transport,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Constraint => "constraint",
            FailureKind::StoreUnavailable => "store_unavailable",
            FailureKind::Store => "store",
            FailureKind::Transport => "transport",
        }
    }

    /// Expected outcomes that should not be reported as anomalies.
    pub fn is_expected(&self) -> bool {
        matches!(self, FailureKind::Constraint | FailureKind::Validation)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error describing why a tool invocation failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: FailureKind,
    /// Human-readable error message
    pub message: String,
    /// Additional details (e.g. the underlying driver message)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(FailureKind::Validation, format!("Unknown tool: {}", name))
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Constraint, message)
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(FailureKind::StoreUnavailable, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Store, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            FailureKind::Transport,
            format!("Operation timed out: {}", operation.into()),
        )
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Success text or typed failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(String),
    Failure(ToolError),
}

/// Structured metadata about a tool execution.
///
/// | Tool | `rows_affected` | `row_count` | `table` |
/// |------|:---:|:---:|:---:|
/// | `create_table` | - | - | yes |
/// | `insert_user` | yes | - | yes |
/// | `list_users` | - | yes | yes |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Rows written by the statement (0 when a constraint rejected the insert)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<usize>,
    /// Rows returned by a query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    /// Table the operation touched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

/// Result of one tool invocation.
///
/// Created by the dispatcher (or by the session channel for transport
/// failures) and consumed once by the caller for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    pub outcome: ToolOutcome,
    /// Machine-readable payload (e.g. the user records of `list_users`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            outcome: ToolOutcome::Success(output.into()),
            data: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            outcome: ToolOutcome::Failure(error),
            data: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ToolResultMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_rows_affected(mut self, rows: usize) -> Self {
        self.metadata.rows_affected = Some(rows);
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success(_))
    }

    /// Get the output text of a successful result
    pub fn output(&self) -> Option<&str> {
        match &self.outcome {
            ToolOutcome::Success(text) => Some(text),
            ToolOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ToolError> {
        match &self.outcome {
            ToolOutcome::Success(_) => None,
            ToolOutcome::Failure(err) => Some(err),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error().map(|e| e.kind)
    }

    /// Text suitable for display, whichever way the call went.
    pub fn display_text(&self) -> String {
        match &self.outcome {
            ToolOutcome::Success(text) => text.clone(),
            ToolOutcome::Failure(err) => err.message.clone(),
        }
    }
}
