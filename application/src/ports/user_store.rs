//! User store port
//!
//! Blocking interface to the persistent relational store. Callers on the
//! async runtime run these methods on the blocking pool.

use dbassist_domain::store::{NewUser, StoreError, TableName, UserRecord};

/// The three store operations exposed as tools
pub trait UserStore: Send + Sync {
    /// Create the table if it does not exist (idempotent)
    fn create_table(&self, table: &TableName) -> Result<(), StoreError>;

    /// Insert one user, returning the number of rows written
    fn insert_user(&self, table: &TableName, user: &NewUser) -> Result<usize, StoreError>;

    /// All users ordered by id
    fn list_users(&self, table: &TableName) -> Result<Vec<UserRecord>, StoreError>;
}
