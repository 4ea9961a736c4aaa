//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file, private in-memory, or shared in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - File connections run in WAL mode so readers never block a commit.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Creates the file and the `contacts` table when absent.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_logged("file", Journal::Wal, || Connection::open(path))
}

/// Opens a private in-memory SQLite database and applies all migrations.
///
/// The database lives as long as the returned connection.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged("memory", Journal::Default, Connection::open_in_memory)
}

/// Opens a named in-memory database on the `memdb` VFS.
///
/// Every connection opened with the same `name` in this process sees the
/// same data for as long as at least one of them stays open. Unlike
/// `cache=shared`, memdb uses ordinary file locking, so lock conflicts
/// between connections wait on the busy timeout instead of failing.
pub fn open_db_shared_memory(name: &str) -> DbResult<Connection> {
    let uri = shared_memory_uri(name);
    open_logged("shared_memory", Journal::Default, || {
        Connection::open(uri.as_str())
    })
}

fn shared_memory_uri(name: &str) -> String {
    // A leading slash is what makes a memdb store visible to other connections.
    format!("file:/{}?vfs=memdb", name.trim_start_matches('/'))
}

/// Routes every statement executed on `conn` to the debug log.
pub fn enable_sql_echo(conn: &mut Connection) {
    conn.trace(Some(log_statement));
}

fn log_statement(sql: &str) {
    debug!("event=sql_echo module=db sql={}", sql.replace(['\n', '\r'], " "));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Journal {
    Default,
    Wal,
}

fn open_logged(
    mode: &'static str,
    journal: Journal,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, journal) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, journal: Journal) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    if journal == Journal::Wal {
        enable_wal(conn)?;
    }
    apply_migrations(conn)?;
    Ok(())
}

fn enable_wal(conn: &Connection) -> DbResult<()> {
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        // Some filesystems cannot host the WAL index; rollback journal still works.
        warn!("event=db_open module=db status=degraded journal_mode={mode}");
    }
    Ok(())
}
