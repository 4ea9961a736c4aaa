//! SQLite storage bootstrap, schema migrations and connection pooling.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the contact store.
//! - Apply schema migrations in deterministic order.
//! - Hand out independent connections to concurrent callers.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write contacts before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
pub mod pool;

pub use open::{enable_sql_echo, open_db, open_db_in_memory, open_db_shared_memory};
pub use pool::{Database, PooledConnection};

pub type DbResult<T> = Result<T, DbError>;

/// Failures raised while opening or migrating the contact store.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected an open, pragma or migration statement.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; it is left untouched.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// A pre-existing `contacts` table lacks columns the store needs, so it
    /// cannot be adopted.
    IncompatibleContactsTable { missing_columns: Vec<String> },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "contact store error: {err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "contact store schema version {found} is newer than supported version {supported}"
            ),
            Self::IncompatibleContactsTable { missing_columns } => write!(
                f,
                "existing contacts table is missing columns: {}",
                missing_columns.join(", ")
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}
