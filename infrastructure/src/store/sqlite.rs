//! SQLite-backed [`UserStore`].
//!
//! Every operation opens its own connection, runs inside a transaction and
//! drops the connection before returning. There is no pooling: the tool
//! server handles one request at a time.

use dbassist_application::ports::user_store::UserStore;
use dbassist_domain::store::{NewUser, StoreError, TableName, UserRecord};
use rusqlite::{Connection, ErrorCode, OpenFlags, Transaction};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default wait for a locked database before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// User store over a single SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|e| {
            StoreError::Unavailable(format!("cannot open {}: {}", self.path.display(), e))
        })?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(conn)
    }

    /// Run `op` in a transaction on a fresh connection and commit.
    fn with_transaction<T>(
        &self,
        op: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(classify)?;
        let value = op(&tx)?;
        tx.commit().map_err(classify)?;
        Ok(value)
    }
}

/// Map a SQLite error onto the store's failure classes.
fn classify(err: rusqlite::Error) -> StoreError {
    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => StoreError::Constraint(err.to_string()),
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly,
        ) => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}

/// Adds table context to errors raised by statements against `table`.
fn classify_for(table: &TableName) -> impl Fn(rusqlite::Error) -> StoreError + '_ {
    move |err| {
        if err.to_string().contains("no such table") {
            StoreError::Query(format!(
                "table '{}' does not exist; create it first",
                table
            ))
        } else {
            classify(err)
        }
    }
}

impl UserStore for SqliteUserStore {
    fn create_table(&self, table: &TableName) -> Result<(), StoreError> {
        info!(table = %table, db = %self.path.display(), "Creating table");
        self.with_transaction(|tx| {
            // TableName only admits [A-Za-z0-9], safe to interpolate
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE
                )",
                table
            );
            tx.execute(&sql, []).map_err(classify)?;
            Ok(())
        })
    }

    fn insert_user(&self, table: &TableName, user: &NewUser) -> Result<usize, StoreError> {
        info!(table = %table, email = %user.email(), "Inserting user");
        let result = self.with_transaction(|tx| {
            let sql = format!("INSERT INTO \"{}\" (name, email) VALUES (?1, ?2)", table);
            tx.execute(&sql, rusqlite::params![user.name(), user.email()])
                .map_err(classify_for(table))
        });

        match result {
            Err(StoreError::Constraint(detail)) => {
                debug!("Insert rejected: {}", detail);
                Err(StoreError::Constraint(format!(
                    "A user with email '{}' already exists",
                    user.email()
                )))
            }
            other => other,
        }
    }

    fn list_users(&self, table: &TableName) -> Result<Vec<UserRecord>, StoreError> {
        info!(table = %table, "Listing users");
        self.with_transaction(|tx| {
            let sql = format!("SELECT id, name, email FROM \"{}\" ORDER BY id", table);
            let mut stmt = tx.prepare(&sql).map_err(classify_for(table))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                })
                .map_err(classify)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(classify)
        })
    }
}
