//! Persistent user store adapters

mod sqlite;

pub use sqlite::{DEFAULT_BUSY_TIMEOUT, SqliteUserStore};
