//! Tool Registry
//!
//! The [`ToolRegistry`] holds one [`ToolHandler`] per tool and implements
//! [`ToolExecutorPort`]. It resolves aliases, validates arguments against the
//! tool definition, and runs handlers on the blocking pool.
//!
//! # Usage
//!
//! ```ignore
//! use dbassist_infrastructure::tools::ToolRegistry;
//!
//! let registry = ToolRegistry::with_user_tools(store, TableName::parse("users")?);
//!
//! let call = ToolCall::new("get_users");
//! let result = registry.dispatch(&call).await;
//! ```
//!
//! # Dispatch
//!
//! 1. The tool name is resolved through the [`ToolSpec`] alias table
//! 2. Unknown names and invalid arguments become `Validation` failures
//!    without running the handler
//! 3. The handler runs in `spawn_blocking`; a panic becomes a `Store` failure
//! 4. The elapsed time is recorded in the result metadata

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use dbassist_application::ports::tool_executor::ToolExecutorPort;
use dbassist_application::ports::user_store::UserStore;
use dbassist_domain::store::TableName;
use dbassist_domain::tool::{
    catalog::TOOL_ALIASES,
    entities::{ToolCall, ToolDefinition, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{ToolError, ToolResult},
};

use super::users::{CreateTableTool, InsertUserTool, ListUsersTool};

/// One tool's implementation.
///
/// Handlers are synchronous; the registry moves them off the async runtime.
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Run the tool. Arguments have already been validated.
    fn handle(&self, call: &ToolCall) -> ToolResult;
}

/// Registry of tool handlers keyed by canonical tool name
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    tool_spec: ToolSpec,
    validator: DefaultToolValidator,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            tool_spec: ToolSpec::new(),
            validator: DefaultToolValidator,
        }
    }

    /// Registry serving the three user-store tools plus their legacy aliases
    pub fn with_user_tools(store: Arc<dyn UserStore>, users_table: TableName) -> Self {
        Self::new()
            .register(CreateTableTool::new(Arc::clone(&store)))
            .register(InsertUserTool::new(Arc::clone(&store), users_table.clone()))
            .register(ListUsersTool::new(store, users_table))
            .with_aliases(TOOL_ALIASES.iter().copied())
    }

    /// Register a tool handler
    pub fn register<H: ToolHandler + 'static>(mut self, handler: H) -> Self {
        let definition = handler.definition();
        tracing::debug!(tool = %definition.name, "Registered tool");
        self.handlers
            .insert(definition.name.clone(), Arc::new(handler));
        self.tool_spec = self.tool_spec.register(definition);
        self
    }

    /// Register alternative names for already-registered tools
    pub fn with_aliases<'a>(mut self, aliases: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.tool_spec = self.tool_spec.register_aliases(aliases);
        self
    }

    /// Validate and run one tool call.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let start = Instant::now();

        let Some(definition) = self.tool_spec.get_resolved(&call.tool_name) else {
            tracing::info!(tool = %call.tool_name, "Rejected unknown tool");
            return ToolResult::failure(&call.tool_name, ToolError::unknown_tool(&call.tool_name));
        };
        let canonical = definition.name.clone();

        if let Err(reason) = self.validator.validate(call, definition) {
            tracing::info!(tool = %canonical, reason = %reason, "Rejected tool arguments");
            return ToolResult::failure(&canonical, ToolError::validation(reason));
        }

        let Some(handler) = self.handlers.get(&canonical).cloned() else {
            return ToolResult::failure(&canonical, ToolError::unknown_tool(&canonical));
        };

        let mut resolved = call.clone();
        resolved.tool_name = canonical.clone();

        tracing::debug!(tool = %canonical, args = ?resolved.argument_names(), "Dispatching tool");
        let result = match tokio::task::spawn_blocking(move || handler.handle(&resolved)).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(tool = %canonical, error = %e, "Tool handler crashed");
                ToolResult::failure(
                    &canonical,
                    ToolError::store(format!("Tool '{}' failed unexpectedly", canonical))
                        .with_details(e.to_string()),
                )
            }
        };

        result.with_duration(start.elapsed().as_millis() as u64)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        self.dispatch(call).await
    }
}
