//! Core domain logic for the contact book.
//! This crate owns storage, session lifecycle and contact invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{ConfigError, DatabaseConfig, DbLocation, DEFAULT_DATABASE_URI};
pub use db::{Database, DbError, DbResult};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::contact::{Contact, ContactId, ContactValidationError};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use service::contact_service::ContactService;
pub use session::{
    run_in_scope, ScopeMode, ScopeOptions, Session, SessionError, SessionResult, SessionState,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
