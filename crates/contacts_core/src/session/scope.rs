//! Unit-of-work wrapper around [`Session`].
//!
//! # Responsibility
//! - Run one unit of work inside exactly one freshly opened session.
//! - Finalize the session deterministically: commit (when enabled), detach,
//!   close.
//!
//! # Invariants
//! - One connection is checked out and one session is opened per call; both
//!   are released before the call returns, on every path.
//! - Only `SessionError::AlreadyFinalized` is swallowed during finalization.
//! - Errors from the unit of work reach the caller unchanged.

use super::{ScopeMode, Session, SessionError, SessionResult};
use crate::db::Database;
use log::{debug, warn};

/// Per-call behavior of [`run_in_scope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeOptions {
    /// Commit on successful return. When `false` the unit of work commits
    /// itself if it needs to; anything left pending is rolled back on close.
    pub auto_commit: bool,
    pub mode: ScopeMode,
}

impl ScopeOptions {
    /// Read-only scope: deferred transaction, never committed by the manager.
    pub fn read() -> Self {
        Self {
            auto_commit: false,
            mode: ScopeMode::Read,
        }
    }

    /// Mutating scope: immediate transaction, committed on success.
    pub fn write() -> Self {
        Self {
            auto_commit: true,
            mode: ScopeMode::Write,
        }
    }
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self::write()
    }
}

/// Runs `work` inside a new session over a pooled connection.
///
/// On `Err` from `work` the session is rolled back and closed and the error
/// is returned as is. On `Ok` the session is finalized with
/// [`finalize_scope`]; a real commit failure is returned instead of the
/// value.
pub fn run_in_scope<T, E, F>(db: &Database, options: ScopeOptions, work: F) -> Result<T, E>
where
    F: FnOnce(&mut Session<'_>) -> Result<T, E>,
    E: From<SessionError>,
{
    // Declared before the session so the session drops first.
    let conn = db.checkout().map_err(SessionError::from)?;
    let mut session = Session::begin(&conn, options.mode)?;

    match work(&mut session) {
        Ok(value) => {
            finalize_scope(&mut session, options)?;
            Ok(value)
        }
        Err(err) => {
            abort_scope(&mut session);
            Err(err)
        }
    }
}

/// Commit (if `auto_commit`), detach and close `session`.
///
/// Idempotent: calling it again on a finalized session is a no-op.
///
/// # Errors
/// - Storage failures from commit (after the session was rolled back and
///   closed) or from the implicit rollback on close.
pub fn finalize_scope(session: &mut Session<'_>, options: ScopeOptions) -> SessionResult<()> {
    if options.auto_commit {
        match session.commit() {
            Ok(()) => debug!("event=session_commit module=session status=ok"),
            Err(err) if err.is_already_finalized() => {
                debug!("event=session_commit module=session status=already_finalized");
            }
            Err(err) => {
                warn!("event=session_commit module=session status=error error={err}");
                abort_scope(session);
                return Err(err);
            }
        }
    } else {
        debug!("event=session_commit module=session status=skipped");
    }

    swallow_finalized("expunge_all", session.expunge_all())?;

    if session.is_active() {
        swallow_finalized("close", session.close())?;
    }
    Ok(())
}

/// Roll back and close `session`, logging instead of returning failures.
///
/// Used on the error path, where the unit-of-work error takes precedence.
pub fn abort_scope(session: &mut Session<'_>) {
    for (step, result) in [
        ("rollback", session.rollback()),
        ("close", session.close()),
    ] {
        match result {
            Ok(()) => debug!("event=session_{step} module=session status=ok"),
            Err(err) if err.is_already_finalized() => {
                debug!("event=session_{step} module=session status=already_finalized");
            }
            Err(err) => warn!("event=session_{step} module=session status=error error={err}"),
        }
    }
}

fn swallow_finalized(step: &'static str, result: SessionResult<()>) -> SessionResult<()> {
    match result {
        Ok(()) => {
            debug!("event=session_{step} module=session status=ok");
            Ok(())
        }
        Err(err) if err.is_already_finalized() => {
            debug!("event=session_{step} module=session status=already_finalized");
            Ok(())
        }
        Err(err) => Err(err),
    }
}
