//! Tool domain module
//!
//! Defines how the user-store operations are described, invoked and
//! reported. Every tool is defined by a [`ToolDefinition`], invoked via a
//! [`ToolCall`], and returns a [`ToolResult`] with structured metadata.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (catalog)    │    │ (invocation) │    │ (outcome)    │
//! └──────┬───────┘    └──────────────┘    └──────────────┘
//!        │
//!        ├─ aliases: "get_users" → "list_users"
//!        └─ tools:   "list_users" → ToolDefinition
//! ```
//!
//! # Tool Name Aliases
//!
//! Older clients and model prompts use names such as `get_users` or
//! `insert_user_tool`. [`ToolSpec::resolve`] maps those onto the canonical
//! names before dispatch; unknown names never reach a handler.
//!
//! # Key Types
//!
//! - [`ToolSpec`]: Catalog of available tools + alias mappings
//! - [`ToolKind`]: The closed set of user-store tools
//! - [`ToolCall`]: An invocation request with arguments
//! - [`ToolResult`]: Success text or a [`ToolError`] tagged with a [`FailureKind`]
//! - [`ToolValidator`]: Pure domain trait for parameter validation

pub mod catalog;
pub mod entities;
pub mod traits;
pub mod value_objects;

pub use catalog::{ToolKind, default_tool_spec};
pub use entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{FailureKind, ToolError, ToolOutcome, ToolResult, ToolResultMetadata};
