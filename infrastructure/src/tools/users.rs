//! User-store tools: `create_table`, `insert_user`, `list_users`.
//!
//! Each handler validates its input into domain values, calls the
//! [`UserStore`] port and shapes the outcome into a [`ToolResult`].

use std::sync::Arc;

use dbassist_application::ports::user_store::UserStore;
use dbassist_domain::store::{NewUser, StoreError, TableName, UserRecord};
use dbassist_domain::tool::{
    catalog::{DEFAULT_TABLE, ToolKind},
    entities::{ToolCall, ToolDefinition},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};

use super::registry::ToolHandler;

fn table_metadata(table: &TableName) -> ToolResultMetadata {
    ToolResultMetadata {
        table: Some(table.to_string()),
        ..ToolResultMetadata::default()
    }
}

fn store_failure(call: &ToolCall, err: StoreError) -> ToolResult {
    match &err {
        StoreError::Constraint(reason) => {
            tracing::info!(tool = %call.tool_name, reason = %reason, "Store rejected write")
        }
        other => tracing::warn!(tool = %call.tool_name, error = %other, "Store operation failed"),
    }
    ToolResult::failure(&call.tool_name, ToolError::from(err))
}

/// `create_table(table_name = "users")`
pub struct CreateTableTool {
    store: Arc<dyn UserStore>,
}

impl CreateTableTool {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

impl ToolHandler for CreateTableTool {
    fn definition(&self) -> ToolDefinition {
        ToolKind::CreateTable.definition()
    }

    fn handle(&self, call: &ToolCall) -> ToolResult {
        let raw = call.get_string("table_name").unwrap_or(DEFAULT_TABLE);
        let table = match TableName::parse(raw) {
            Ok(table) => table,
            Err(e) => return store_failure(call, e),
        };

        match self.store.create_table(&table) {
            Ok(()) => ToolResult::success(
                &call.tool_name,
                format!("Table '{}' created successfully.", table),
            )
            .with_metadata(table_metadata(&table)),
            Err(e) => store_failure(call, e).with_metadata(table_metadata(&table)),
        }
    }
}

/// `insert_user(name, email)` into the configured users table
pub struct InsertUserTool {
    store: Arc<dyn UserStore>,
    table: TableName,
}

impl InsertUserTool {
    pub fn new(store: Arc<dyn UserStore>, table: TableName) -> Self {
        Self { store, table }
    }
}

impl ToolHandler for InsertUserTool {
    fn definition(&self) -> ToolDefinition {
        ToolKind::InsertUser.definition()
    }

    fn handle(&self, call: &ToolCall) -> ToolResult {
        let user = match NewUser::new(
            call.get_string("name").unwrap_or_default(),
            call.get_string("email").unwrap_or_default(),
        ) {
            Ok(user) => user,
            Err(e) => return store_failure(call, e),
        };

        let metadata = table_metadata(&self.table);
        match self.store.insert_user(&self.table, &user) {
            Ok(rows) => ToolResult::success(
                &call.tool_name,
                format!(
                    "User inserted successfully ({} row{} affected).",
                    rows,
                    if rows == 1 { "" } else { "s" }
                ),
            )
            .with_metadata(metadata)
            .with_rows_affected(rows),
            Err(e @ StoreError::Constraint(_)) => store_failure(call, e)
                .with_metadata(metadata)
                .with_rows_affected(0),
            Err(e) => store_failure(call, e).with_metadata(metadata),
        }
    }
}

/// `list_users()` from the configured users table
pub struct ListUsersTool {
    store: Arc<dyn UserStore>,
    table: TableName,
}

impl ListUsersTool {
    pub fn new(store: Arc<dyn UserStore>, table: TableName) -> Self {
        Self { store, table }
    }

    fn render(users: &[UserRecord]) -> String {
        if users.is_empty() {
            return "No users found.".to_string();
        }
        let mut text = format!("{} user(s):", users.len());
        for user in users {
            text.push_str(&format!("\n  - {}", user));
        }
        text
    }
}

impl ToolHandler for ListUsersTool {
    fn definition(&self) -> ToolDefinition {
        ToolKind::ListUsers.definition()
    }

    fn handle(&self, call: &ToolCall) -> ToolResult {
        let metadata = table_metadata(&self.table);
        match self.store.list_users(&self.table) {
            Ok(users) => {
                let data = serde_json::to_value(&users).unwrap_or_default();
                ToolResult::success(&call.tool_name, Self::render(&users))
                    .with_metadata(ToolResultMetadata {
                        row_count: Some(users.len()),
                        ..metadata
                    })
                    .with_data(data)
            }
            Err(e) => store_failure(call, e).with_metadata(metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbassist_domain::tool::value_objects::FailureKind;
    use std::sync::Mutex;

    /// In-memory store recording which operations ran
    #[derive(Default)]
    struct MemoryStore {
        tables: Mutex<Vec<String>>,
        users: Mutex<Vec<UserRecord>>,
        ops: Mutex<Vec<&'static str>>,
    }

    impl UserStore for MemoryStore {
        fn create_table(&self, table: &TableName) -> Result<(), StoreError> {
            self.ops.lock().unwrap().push("create_table");
            let mut tables = self.tables.lock().unwrap();
            if !tables.iter().any(|t| t == table.as_str()) {
                tables.push(table.to_string());
            }
            Ok(())
        }

        fn insert_user(&self, _table: &TableName, user: &NewUser) -> Result<usize, StoreError> {
            self.ops.lock().unwrap().push("insert_user");
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == user.email()) {
                return Err(StoreError::Constraint(format!(
                    "A user with email '{}' already exists",
                    user.email()
                )));
            }
            let id = users.len() as i64 + 1;
            users.push(UserRecord {
                id,
                name: user.name().to_string(),
                email: user.email().to_string(),
            });
            Ok(1)
        }

        fn list_users(&self, _table: &TableName) -> Result<Vec<UserRecord>, StoreError> {
            self.ops.lock().unwrap().push("list_users");
            Ok(self.users.lock().unwrap().clone())
        }
    }

    fn users_table() -> TableName {
        TableName::parse("users").unwrap()
    }

    #[test]
    fn test_create_table_defaults_to_users() {
        let store = Arc::new(MemoryStore::default());
        let tool = CreateTableTool::new(store.clone());

        let result = tool.handle(&ToolCall::new("create_table"));
        assert_eq!(result.output(), Some("Table 'users' created successfully."));
        assert_eq!(result.metadata.table.as_deref(), Some("users"));
        assert_eq!(*store.tables.lock().unwrap(), vec!["users".to_string()]);
    }

    #[test]
    fn test_create_table_rejects_bad_identifier_without_store_call() {
        let store = Arc::new(MemoryStore::default());
        let tool = CreateTableTool::new(store.clone());

        for bad in ["drop table users;--", "user-s", "", "tab le"] {
            let result = tool.handle(&ToolCall::new("create_table").with_arg("table_name", bad));
            assert_eq!(result.failure_kind(), Some(FailureKind::Validation), "{bad}");
        }
        assert!(store.ops.lock().unwrap().is_empty());
    }

    #[test]
    fn test_insert_then_duplicate() {
        let store = Arc::new(MemoryStore::default());
        let tool = InsertUserTool::new(store.clone(), users_table());
        let call = ToolCall::new("insert_user")
            .with_arg("name", "Bob")
            .with_arg("email", "bob@x.com");

        let first = tool.handle(&call);
        assert_eq!(
            first.output(),
            Some("User inserted successfully (1 row affected).")
        );
        assert_eq!(first.metadata.rows_affected, Some(1));

        let second = tool.handle(&call);
        assert_eq!(second.failure_kind(), Some(FailureKind::Constraint));
        assert_eq!(second.metadata.rows_affected, Some(0));
    }

    #[test]
    fn test_insert_rejects_bad_email() {
        let store = Arc::new(MemoryStore::default());
        let tool = InsertUserTool::new(store.clone(), users_table());

        let result = tool.handle(
            &ToolCall::new("insert_user")
                .with_arg("name", "Bob")
                .with_arg("email", "not-an-email"),
        );
        assert_eq!(result.failure_kind(), Some(FailureKind::Validation));
        assert!(store.ops.lock().unwrap().is_empty());
    }

    #[test]
    fn test_list_users_empty_and_populated() {
        let store = Arc::new(MemoryStore::default());
        let list = ListUsersTool::new(store.clone(), users_table());

        let empty = list.handle(&ToolCall::new("list_users"));
        assert!(empty.is_success());
        assert_eq!(empty.output(), Some("No users found."));
        assert_eq!(empty.metadata.row_count, Some(0));

        let insert = InsertUserTool::new(store.clone(), users_table());
        insert.handle(
            &ToolCall::new("insert_user")
                .with_arg("name", "Bob")
                .with_arg("email", "bob@x.com"),
        );

        let listed = list.handle(&ToolCall::new("list_users"));
        assert_eq!(
            listed.output(),
            Some("1 user(s):\n  - ID: 1, Name: Bob, Email: bob@x.com")
        );
        assert_eq!(listed.data.as_ref().unwrap()[0]["email"], "bob@x.com");
        assert_eq!(listed.metadata.row_count, Some(1));
    }
}
