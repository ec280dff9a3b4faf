//! User store domain: records, table identifiers and store errors.
//!
//! The store itself is reached through the `UserStore` port in the
//! application layer; this module only holds the pure types it speaks.

pub mod entities;
pub mod error;

pub use entities::{MAX_TABLE_NAME_LEN, NewUser, TableName, UserRecord};
pub use error::StoreError;
