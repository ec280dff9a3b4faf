//! Command entities

use crate::tool::catalog::{DEFAULT_TABLE, ToolKind};
use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// A structured database operation extracted from a model reply.
///
/// Only ever constructed with every field its variant needs; a reply that
/// cannot fill them produces no command at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CreateTable { table: String },
    InsertUser { name: String, email: String },
    ListUsers,
}

impl Command {
    /// Create-table command, falling back to the default table for a blank name
    pub fn create_table(table: impl Into<String>) -> Self {
        let table = table.into();
        let table = if table.trim().is_empty() {
            DEFAULT_TABLE.to_string()
        } else {
            table
        };
        Command::CreateTable { table }
    }

    pub fn insert_user(name: impl Into<String>, email: impl Into<String>) -> Self {
        Command::InsertUser {
            name: name.into(),
            email: email.into(),
        }
    }

    /// The tool that executes this command
    pub fn kind(&self) -> ToolKind {
        match self {
            Command::CreateTable { .. } => ToolKind::CreateTable,
            Command::InsertUser { .. } => ToolKind::InsertUser,
            Command::ListUsers => ToolKind::ListUsers,
        }
    }

    /// Build the invocation for this command.
    ///
    /// Argument keys are exactly the parameter names declared by the tool.
    pub fn to_tool_call(&self) -> ToolCall {
        let call = ToolCall::new(self.kind().name());
        match self {
            Command::CreateTable { table } => call.with_arg("table_name", table.as_str()),
            Command::InsertUser { name, email } => call
                .with_arg("name", name.as_str())
                .with_arg("email", email.as_str()),
            Command::ListUsers => call,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::CreateTable { table } => write!(f, "create table '{}'", table),
            Command::InsertUser { name, email } => {
                write!(f, "insert user '{}' <{}>", name, email)
            }
            Command::ListUsers => write!(f, "list users"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{DefaultToolValidator, ToolValidator};

    #[test]
    fn test_create_table_defaults_blank_name() {
        assert_eq!(
            Command::create_table(""),
            Command::CreateTable {
                table: "users".to_string()
            }
        );
        assert_eq!(
            Command::create_table("staff"),
            Command::CreateTable {
                table: "staff".to_string()
            }
        );
    }

    #[test]
    fn test_to_tool_call_matches_definitions() {
        let commands = [
            Command::create_table("employees"),
            Command::insert_user("Bob", "bob@x.com"),
            Command::ListUsers,
        ];
        for command in commands {
            let call = command.to_tool_call();
            let definition = command.kind().definition();
            assert_eq!(call.tool_name, definition.name);
            assert!(DefaultToolValidator.validate(&call, &definition).is_ok());
        }
    }

    #[test]
    fn test_insert_tool_call_arguments() {
        let call = Command::insert_user("Bob", "bob@x.com").to_tool_call();
        assert_eq!(call.tool_name, "insert_user");
        assert_eq!(call.get_string("name"), Some("Bob"));
        assert_eq!(call.get_string("email"), Some("bob@x.com"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::ListUsers.to_string(), "list users");
        assert_eq!(
            Command::create_table("staff").to_string(),
            "create table 'staff'"
        );
    }
}
