//! Connection pool over one configured contact store.
//!
//! # Responsibility
//! - Create the schema once when the store is opened.
//! - Hand out one independent connection per unit of work.
//! - Recycle idle connections up to a fixed bound.
//!
//! # Invariants
//! - A connection is never shared by two checkouts at the same time.
//! - A connection that still holds an open transaction is never recycled.
//! - In-memory stores stay alive for as long as the `Database` does.

use super::open::{enable_sql_echo, open_db, open_db_shared_memory};
use super::DbResult;
use crate::config::{DatabaseConfig, DbLocation};
use log::{info, warn};
use rusqlite::Connection;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

static MEMORY_DB_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
enum Target {
    File(PathBuf),
    SharedMemory(String),
}

/// Storage engine handle: owns the location and the idle connections.
///
/// `Database` is `Send + Sync`; wrap it in `Arc` to share across threads.
#[derive(Debug)]
pub struct Database {
    target: Target,
    echo_sql: bool,
    max_idle: usize,
    idle: Mutex<Vec<Connection>>,
    // Keeps a shared in-memory database alive between checkouts.
    _anchor: Option<Mutex<Connection>>,
}

impl Database {
    /// Opens the configured store and creates the schema when absent.
    ///
    /// # Errors
    /// - Returns `DbError` when the store cannot be opened or migrated.
    pub fn open(config: &DatabaseConfig) -> DbResult<Self> {
        let (target, anchor) = match &config.location {
            DbLocation::File(path) => (Target::File(path.clone()), None),
            DbLocation::Memory => {
                let name = format!(
                    "contacts-mem-{}-{}",
                    std::process::id(),
                    MEMORY_DB_SEQUENCE.fetch_add(1, Ordering::Relaxed)
                );
                let anchor = open_db_shared_memory(&name)?;
                (Target::SharedMemory(name), Some(Mutex::new(anchor)))
            }
        };

        let database = Self {
            target,
            echo_sql: config.echo_sql,
            max_idle: config.pool_max_idle,
            idle: Mutex::new(Vec::new()),
            _anchor: anchor,
        };

        // First connection runs the migrations and seeds the idle list.
        let first = database.connect()?;
        database.release(first);
        info!(
            "event=pool_open module=db status=ok target={} max_idle={}",
            database.describe_target(),
            database.max_idle
        );
        Ok(database)
    }

    /// Opens a fresh in-memory store with default settings.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(&DatabaseConfig::in_memory())
    }

    /// Checks out a connection, reusing an idle one when available.
    pub fn checkout(&self) -> DbResult<PooledConnection<'_>> {
        let recycled = self.lock_idle().pop();
        let conn = match recycled {
            Some(conn) => conn,
            None => self.connect()?,
        };
        Ok(PooledConnection {
            conn: Some(conn),
            pool: self,
        })
    }

    /// Returns the number of connections currently parked in the pool.
    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    fn connect(&self) -> DbResult<Connection> {
        let mut conn = match &self.target {
            Target::File(path) => open_db(path)?,
            Target::SharedMemory(name) => open_db_shared_memory(name)?,
        };
        if self.echo_sql {
            enable_sql_echo(&mut conn);
        }
        Ok(conn)
    }

    fn release(&self, conn: Connection) {
        if !conn.is_autocommit() {
            warn!("event=pool_release module=db status=discarded reason=open_transaction");
            return;
        }
        let mut idle = self.lock_idle();
        if idle.len() < self.max_idle {
            idle.push(conn);
        }
    }

    fn lock_idle(&self) -> MutexGuard<'_, Vec<Connection>> {
        // Idle connections carry no transaction state, so a poisoned list is
        // still consistent.
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn describe_target(&self) -> String {
        match &self.target {
            Target::File(path) => format!("file:{}", path.display()),
            Target::SharedMemory(name) => format!("memory:{name}"),
        }
    }
}

/// Connection checked out of a [`Database`]; returns to the pool on drop.
pub struct PooledConnection<'pool> {
    conn: Option<Connection>,
    pool: &'pool Database,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection is only taken on drop"),
        }
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}
