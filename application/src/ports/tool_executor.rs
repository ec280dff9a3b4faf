//! Tool Executor port
//!
//! Defines the interface for executing tools in-process (the tool server's
//! dispatcher).

use async_trait::async_trait;
use dbassist_domain::tool::{
    entities::{ToolCall, ToolSpec},
    value_objects::ToolResult,
};

/// Port for tool execution
///
/// This port defines how a tool call is turned into a [`ToolResult`].
/// Implementations never fail outright: every error is reported inside the
/// returned result.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool (or one of its aliases) is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get_resolved(name).is_some()
    }

    /// Get names of all available tools
    fn available_tools(&self) -> Vec<&str> {
        self.tool_spec().names().collect()
    }

    /// Execute a tool call
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}
