//! Transactional session scopes.
//!
//! # Responsibility
//! - Wrap one connection in one explicit transaction with a tracked state.
//! - Keep an identity set of rows materialized inside the scope.
//! - Classify finalization errors so callers can tell "already finalized"
//!   apart from real storage failures.
//!
//! # Invariants
//! - State moves `New -> Open -> (Committed | RolledBack) -> Detached -> Closed`;
//!   read scopes that never commit go `Open -> Detached -> Closed`.
//! - `Closed` is terminal; every finalization call on it reports
//!   `SessionError::AlreadyFinalized`.
//! - A dropped session never leaves its transaction open.

use crate::db::DbError;
use log::{debug, warn};
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod scope;

pub use scope::{abort_scope, finalize_scope, run_in_scope, ScopeOptions};

pub type SessionResult<T> = Result<T, SessionError>;

/// Identity of a tracked row: table name plus primary key.
pub type EntityKey = (&'static str, i64);

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    Open,
    Committed,
    RolledBack,
    Detached,
    Closed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Open => "open",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
            Self::Detached => "detached",
            Self::Closed => "closed",
        }
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locking intent of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    /// `BEGIN DEFERRED`: takes no write lock until the first write.
    Read,
    /// `BEGIN IMMEDIATE`: takes the write lock up front.
    Write,
}

impl ScopeMode {
    fn begin_sql(self) -> &'static str {
        match self {
            Self::Read => "BEGIN DEFERRED;",
            Self::Write => "BEGIN IMMEDIATE;",
        }
    }
}

/// Session-layer error taxonomy.
#[derive(Debug)]
pub enum SessionError {
    /// Finalization step invoked on a scope already past it.
    AlreadyFinalized {
        operation: &'static str,
        state: SessionState,
    },
    /// Read/write attempted on a scope that no longer holds a transaction.
    NotOpen { state: SessionState },
    Db(DbError),
}

impl SessionError {
    /// Returns whether this is the benign "already finalized" condition.
    pub fn is_already_finalized(&self) -> bool {
        matches!(self, Self::AlreadyFinalized { .. })
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyFinalized { operation, state } => {
                write!(f, "cannot {operation}: session is already {state}")
            }
            Self::NotOpen { state } => write!(f, "session is not open (state: {state})"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AlreadyFinalized { .. } | Self::NotOpen { .. } => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for SessionError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One transactional scope over a borrowed connection.
pub struct Session<'conn> {
    conn: &'conn Connection,
    state: SessionState,
    in_transaction: bool,
    tracked: BTreeSet<EntityKey>,
}

impl<'conn> Session<'conn> {
    /// Begins a transaction on `conn` and returns the open session.
    pub fn begin(conn: &'conn Connection, mode: ScopeMode) -> SessionResult<Self> {
        let mut session = Self {
            conn,
            state: SessionState::New,
            in_transaction: false,
            tracked: BTreeSet::new(),
        };
        conn.execute_batch(mode.begin_sql())?;
        session.in_transaction = true;
        session.state = SessionState::Open;
        debug!(
            "event=session_open module=session status=ok mode={}",
            match mode {
                ScopeMode::Read => "read",
                ScopeMode::Write => "write",
            }
        );
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `false` only once the session reached `Closed`.
    pub fn is_active(&self) -> bool {
        self.state != SessionState::Closed
    }

    /// Returns whether the underlying transaction is still pending.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Returns the connection for statements inside this scope.
    ///
    /// # Errors
    /// - `SessionError::NotOpen` once the scope committed, rolled back,
    ///   detached or closed.
    pub fn connection(&self) -> SessionResult<&'conn Connection> {
        if self.state != SessionState::Open || !self.in_transaction {
            return Err(SessionError::NotOpen { state: self.state });
        }
        Ok(self.conn)
    }

    /// Registers a row as materialized in this scope.
    pub fn track(&mut self, table: &'static str, id: i64) {
        self.tracked.insert((table, id));
    }

    /// Stops tracking a row (after it was deleted).
    pub fn forget(&mut self, table: &'static str, id: i64) {
        self.tracked.remove(&(table, id));
    }

    pub fn is_tracked(&self, table: &'static str, id: i64) -> bool {
        self.tracked.contains(&(table, id))
    }

    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }

    /// Commits the pending transaction.
    ///
    /// # Errors
    /// - `AlreadyFinalized` when nothing is pending.
    /// - `Db` when SQLite refuses the commit; if SQLite already dropped the
    ///   transaction the session moves to `RolledBack`.
    pub fn commit(&mut self) -> SessionResult<()> {
        if self.state != SessionState::Open || !self.in_transaction {
            return Err(self.already_finalized("commit"));
        }
        if let Err(err) = self.conn.execute_batch("COMMIT;") {
            if self.conn.is_autocommit() {
                self.in_transaction = false;
                self.state = SessionState::RolledBack;
            }
            return Err(err.into());
        }
        self.in_transaction = false;
        self.state = SessionState::Committed;
        Ok(())
    }

    /// Rolls back the pending transaction.
    pub fn rollback(&mut self) -> SessionResult<()> {
        if !self.in_transaction || self.state == SessionState::Closed {
            return Err(self.already_finalized("rollback"));
        }
        let result = self.conn.execute_batch("ROLLBACK;");
        if result.is_ok() || self.conn.is_autocommit() {
            self.in_transaction = false;
            self.state = SessionState::RolledBack;
        }
        result.map_err(SessionError::from)
    }

    /// Detaches every tracked row from the scope.
    pub fn expunge_all(&mut self) -> SessionResult<()> {
        match self.state {
            SessionState::New | SessionState::Detached | SessionState::Closed => {
                Err(self.already_finalized("expunge_all"))
            }
            _ => {
                self.tracked.clear();
                self.state = SessionState::Detached;
                Ok(())
            }
        }
    }

    /// Releases the scope, rolling back anything still pending.
    ///
    /// The session is `Closed` afterwards even when the implicit rollback
    /// fails; that failure is still reported.
    pub fn close(&mut self) -> SessionResult<()> {
        if self.state == SessionState::Closed {
            return Err(self.already_finalized("close"));
        }
        let result = if self.in_transaction {
            self.conn.execute_batch("ROLLBACK;")
        } else {
            Ok(())
        };
        self.in_transaction = false;
        self.tracked.clear();
        self.state = SessionState::Closed;
        result.map_err(SessionError::from)
    }

    fn already_finalized(&self, operation: &'static str) -> SessionError {
        SessionError::AlreadyFinalized {
            operation,
            state: self.state,
        }
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if !self.in_transaction {
            return;
        }
        warn!(
            "event=session_drop module=session status=rollback state={}",
            self.state
        );
        if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
            warn!("event=session_drop module=session status=error error={err}");
        }
    }
}
