//! Domain layer for dbassist
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Command
//!
//! A model reply is routed through the [`CommandGrammar`], which yields at
//! most one [`Command`]: create a table, insert a user, or list users.
//!
//! ## Tool
//!
//! Each command maps onto a tool call ([`ToolCall`]) executed by a separate
//! tool server. The outcome comes back as a [`ToolResult`] whose failures are
//! classified by [`FailureKind`].

pub mod command;
pub mod config;
pub mod core;
pub mod prompt;
pub mod store;
pub mod tool;

// Re-export commonly used types
pub use command::{Command, CommandGrammar, ParseOutcome};
pub use config::{ConfigIssue, ConfigIssueCode, ProviderKind, Severity};
pub use core::error::DomainError;
pub use prompt::PromptTemplate;
pub use store::{NewUser, StoreError, TableName, UserRecord};
pub use tool::{
    catalog::{DEFAULT_TABLE, ToolKind, default_tool_spec},
    entities::{ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{FailureKind, ToolError, ToolOutcome, ToolResult, ToolResultMetadata},
};
