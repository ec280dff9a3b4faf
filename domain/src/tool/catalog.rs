//! The closed set of user-store tools
//!
//! Three tools are exposed by the tool server. Their names, parameter
//! shapes and legacy aliases live here so the server, the client and the
//! command grammar agree on a single definition.

use super::entities::{ToolDefinition, ToolParameter, ToolSpec};

pub const CREATE_TABLE: &str = "create_table";
pub const INSERT_USER: &str = "insert_user";
pub const LIST_USERS: &str = "list_users";

/// Table created when no name is given.
pub const DEFAULT_TABLE: &str = "users";

/// Legacy tool names still accepted by the dispatcher.
pub const TOOL_ALIASES: &[(&str, &str)] = &[
    ("create_table_tool", CREATE_TABLE),
    ("insert_user_tool", INSERT_USER),
    ("get_users_tool", LIST_USERS),
    ("get_users", LIST_USERS),
];

/// Kind of user-store tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    CreateTable,
    InsertUser,
    ListUsers,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [
        ToolKind::CreateTable,
        ToolKind::InsertUser,
        ToolKind::ListUsers,
    ];

    /// Canonical tool name
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::CreateTable => CREATE_TABLE,
            ToolKind::InsertUser => INSERT_USER,
            ToolKind::ListUsers => LIST_USERS,
        }
    }

    /// Look up a kind by canonical name (aliases are resolved by [`ToolSpec`]).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn definition(&self) -> ToolDefinition {
        match self {
            ToolKind::CreateTable => ToolDefinition::new(
                CREATE_TABLE,
                "Create a user table (id, name, email) if it does not already exist",
            )
            .with_parameter(
                ToolParameter::new(
                    "table_name",
                    "Alphanumeric table name (defaults to 'users')",
                    false,
                )
                .with_default(DEFAULT_TABLE),
            ),
            ToolKind::InsertUser => ToolDefinition::new(INSERT_USER, "Insert a user record")
                .with_parameter(ToolParameter::new("name", "Full name of the user", true))
                .with_parameter(ToolParameter::new(
                    "email",
                    "Email address (must be unique)",
                    true,
                )),
            ToolKind::ListUsers => {
                ToolDefinition::new(LIST_USERS, "List all user records ordered by id")
            }
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tool spec with the three user-store tools and their aliases.
pub fn default_tool_spec() -> ToolSpec {
    ToolKind::ALL
        .iter()
        .fold(ToolSpec::new(), |spec, kind| spec.register(kind.definition()))
        .register_aliases(TOOL_ALIASES.iter().copied())
}
