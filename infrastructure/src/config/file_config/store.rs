//! User store configuration from TOML (`[store]` section)

use dbassist_domain::{ConfigIssue, ConfigIssueCode, DEFAULT_TABLE, TableName};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Raw user store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// SQLite database file
    pub path: PathBuf,
    /// Table used by insert_user and list_users
    pub users_table: String,
    pub busy_timeout_ms: u64,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("users.db"),
            users_table: DEFAULT_TABLE.to_string(),
            busy_timeout_ms: 5000,
        }
    }
}

impl FileStoreConfig {
    /// Parse the users table name, falling back to `users`.
    pub fn parse_users_table(&self) -> (TableName, Vec<ConfigIssue>) {
        match TableName::parse(&self.users_table) {
            Ok(table) => (table, vec![]),
            Err(e) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidTableName,
                    format!("store.users_table: {}", e),
                );
                (TableName::default(), vec![issue])
            }
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.parse_users_table().1
    }
}
