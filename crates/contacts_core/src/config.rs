//! Storage configuration.
//!
//! # Responsibility
//! - Describe where the contact store lives and how connections behave.
//! - Parse `sqlite://` connection URIs into a typed location.
//!
//! # Invariants
//! - The default location is a local file named `contacts.db`.
//! - Unknown URI schemes are rejected instead of silently falling back.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Connection URI used when the caller does not provide one.
pub const DEFAULT_DATABASE_URI: &str = "sqlite:///contacts.db";
/// Maximum number of idle connections kept by the pool.
pub const DEFAULT_POOL_MAX_IDLE: usize = 4;

const SQLITE_SCHEME_PREFIX: &str = "sqlite://";
const MEMORY_MARKER: &str = ":memory:";

/// Physical location of the contact store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// File-backed database, relative paths resolve against the working dir.
    File(PathBuf),
    /// Process-local database shared by every connection of one pool.
    Memory,
}

/// Storage settings consumed by [`crate::db::Database::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub location: DbLocation,
    /// Logs every executed SQL statement at debug level.
    pub echo_sql: bool,
    pub pool_max_idle: usize,
}

impl DatabaseConfig {
    /// Builds a config for a file-backed store.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_location(DbLocation::File(path.into()))
    }

    /// Builds a config for a process-local in-memory store.
    pub fn in_memory() -> Self {
        Self::with_location(DbLocation::Memory)
    }

    /// Parses a connection URI.
    ///
    /// Accepted forms:
    /// - `sqlite:///relative.db` and `sqlite:////absolute/path.db`
    /// - `sqlite://`, `sqlite:///:memory:` and `:memory:` for in-memory stores
    /// - a bare filesystem path
    ///
    /// # Errors
    /// - `ConfigError::EmptyUri` for blank input.
    /// - `ConfigError::UnsupportedScheme` for any scheme other than `sqlite`.
    /// - `ConfigError::UnsupportedAuthority` for `sqlite://host/...` forms.
    pub fn from_uri(uri: &str) -> Result<Self, ConfigError> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyUri);
        }
        if trimmed == MEMORY_MARKER {
            return Ok(Self::in_memory());
        }

        let Some(rest) = trimmed.strip_prefix(SQLITE_SCHEME_PREFIX) else {
            if let Some((scheme, _)) = trimmed.split_once("://") {
                return Err(ConfigError::UnsupportedScheme(scheme.to_string()));
            }
            return Ok(Self::file(trimmed));
        };

        if rest.is_empty() {
            return Ok(Self::in_memory());
        }
        let Some(path) = rest.strip_prefix('/') else {
            return Err(ConfigError::UnsupportedAuthority(trimmed.to_string()));
        };
        match path {
            "" => Err(ConfigError::EmptyPath),
            MEMORY_MARKER => Ok(Self::in_memory()),
            path => Ok(Self::file(path)),
        }
    }

    /// Enables or disables SQL statement echo.
    pub fn echo_sql(mut self, enabled: bool) -> Self {
        self.echo_sql = enabled;
        self
    }

    /// Returns the file path for file-backed stores.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.location {
            DbLocation::File(path) => Some(path.as_path()),
            DbLocation::Memory => None,
        }
    }

    fn with_location(location: DbLocation) -> Self {
        Self {
            location,
            echo_sql: false,
            pool_max_idle: DEFAULT_POOL_MAX_IDLE,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::file("contacts.db")
    }
}

/// Errors raised while parsing storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyUri,
    EmptyPath,
    UnsupportedScheme(String),
    UnsupportedAuthority(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUri => write!(f, "database uri cannot be empty"),
            Self::EmptyPath => write!(f, "database uri has an empty path"),
            Self::UnsupportedScheme(scheme) => write!(
                f,
                "unsupported database scheme `{scheme}`; expected `sqlite`"
            ),
            Self::UnsupportedAuthority(uri) => write!(
                f,
                "database uri `{uri}` names a host; use `sqlite:///<path>`"
            ),
        }
    }
}

impl Error for ConfigError {}
