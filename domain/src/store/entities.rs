//! User store entities and value objects

use super::error::StoreError;
use crate::tool::catalog::DEFAULT_TABLE;
use serde::{Deserialize, Serialize};

/// Maximum length of a table identifier.
pub const MAX_TABLE_NAME_LEN: usize = 64;

/// A validated table identifier (Value Object)
///
/// Only ASCII letters and digits are accepted, so the name can be
/// interpolated into DDL without quoting concerns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        if raw.is_empty() {
            return Err(StoreError::Validation(
                "Table name cannot be empty".to_string(),
            ));
        }
        if raw.len() > MAX_TABLE_NAME_LEN {
            return Err(StoreError::Validation(format!(
                "Table name '{}' is longer than {} characters",
                raw, MAX_TABLE_NAME_LEN
            )));
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StoreError::Validation(format!(
                "Invalid table name '{}': only letters and digits are allowed",
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The conventional `users` table
impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE.to_string())
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for TableName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        TableName::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A stored user row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Store-assigned, unique and monotonic
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl std::fmt::Display for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ID: {}, Name: {}, Email: {}", self.id, self.name, self.email)
    }
}

/// A user about to be inserted (no id yet)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
}

impl NewUser {
    /// Validate and build a new user.
    ///
    /// Surrounding whitespace is trimmed. The name must be non-empty; the
    /// email must have exactly one `@` with text on both sides.
    pub fn new(name: &str, email: &str) -> Result<Self, StoreError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() {
            return Err(StoreError::Validation("Name cannot be empty".to_string()));
        }
        if email.is_empty() {
            return Err(StoreError::Validation("Email cannot be empty".to_string()));
        }

        let mut parts = email.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !well_formed || email.chars().any(char::is_whitespace) {
            return Err(StoreError::Validation(format!(
                "Invalid email address '{}'",
                email
            )));
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_accepts_alphanumeric() {
        assert_eq!(TableName::parse("users").unwrap().as_str(), "users");
        assert_eq!(TableName::parse("Users2024").unwrap().as_str(), "Users2024");
    }

    #[test]
    fn test_table_name_rejects_invalid() {
        for raw in ["", "drop;table", "my_users", "users table", "ünïcode", "a-b"] {
            assert!(
                matches!(TableName::parse(raw), Err(StoreError::Validation(_))),
                "expected rejection for {raw:?}"
            );
        }
    }

    #[test]
    fn test_table_name_length_limit() {
        let ok = "a".repeat(MAX_TABLE_NAME_LEN);
        let too_long = "a".repeat(MAX_TABLE_NAME_LEN + 1);
        assert!(TableName::parse(&ok).is_ok());
        assert!(TableName::parse(&too_long).is_err());
    }

    #[test]
    fn test_table_name_deserialize_validates() {
        let ok: TableName = serde_json::from_str(r#""people""#).unwrap();
        assert_eq!(ok.as_str(), "people");
        assert!(serde_json::from_str::<TableName>(r#""bad name""#).is_err());
    }

    #[test]
    fn test_new_user_validation() {
        let user = NewUser::new("  Bob ", " bob@x.com").unwrap();
        assert_eq!(user.name(), "Bob");
        assert_eq!(user.email(), "bob@x.com");

        assert!(NewUser::new("", "bob@x.com").is_err());
        assert!(NewUser::new("Bob", "").is_err());
        assert!(NewUser::new("Bob", "not-an-email").is_err());
        assert!(NewUser::new("Bob", "a@b@c").is_err());
        assert!(NewUser::new("Bob", "@x.com").is_err());
        assert!(NewUser::new("Bob", "bo b@x.com").is_err());
    }

    #[test]
    fn test_user_record_display() {
        let record = UserRecord {
            id: 1,
            name: "Bob".to_string(),
            email: "bob@x.com".to_string(),
        };
        assert_eq!(record.to_string(), "ID: 1, Name: Bob, Email: bob@x.com");
    }
}
