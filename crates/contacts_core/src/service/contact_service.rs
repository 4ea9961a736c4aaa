//! Contact use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for boundary callers.
//! - Run each repository call in its own session scope.
//!
//! # Invariants
//! - Reads use `ScopeOptions::read()` and never commit.
//! - Writes use `ScopeOptions::write()` and commit before returning.
//! - No session outlives a single service call.

use crate::config::DatabaseConfig;
use crate::db::{Database, DbResult};
use crate::model::contact::{Contact, ContactId};
use crate::repo::contact_repo::{ContactRepository, RepoResult, SqliteContactRepository};
use crate::session::{run_in_scope, ScopeOptions};

/// Use-case service wrapper for contact CRUD operations.
#[derive(Debug)]
pub struct ContactService<R: ContactRepository = SqliteContactRepository> {
    db: Database,
    repo: R,
}

impl ContactService<SqliteContactRepository> {
    /// Opens the configured store with the SQLite repository.
    pub fn open(config: &DatabaseConfig) -> DbResult<Self> {
        Ok(Self::new(Database::open(config)?, SqliteContactRepository::new()))
    }
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service over `db` using the provided repository.
    pub fn new(db: Database, repo: R) -> Self {
        Self { db, repo }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Lists all contacts.
    pub fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        run_in_scope(&self.db, ScopeOptions::read(), |session| {
            self.repo.list_contacts(session)
        })
    }

    /// Gets one contact by id; `Ok(None)` when absent.
    pub fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        run_in_scope(&self.db, ScopeOptions::read(), |session| {
            self.repo.get_contact(session, id)
        })
    }

    /// Validates and persists a new contact, returning it with its id.
    pub fn create_contact(
        &self,
        name: &str,
        surname: &str,
        phone: &str,
        email: &str,
    ) -> RepoResult<Contact> {
        run_in_scope(&self.db, ScopeOptions::write(), |session| {
            self.repo
                .create_contact(session, name, surname, phone, email)
        })
    }

    /// Persists the in-memory state of an existing contact.
    ///
    /// Not guarded against concurrent read-modify-write: the last writer wins.
    pub fn update_contact(&self, contact: Contact) -> RepoResult<Contact> {
        run_in_scope(&self.db, ScopeOptions::write(), |session| {
            self.repo.update_contact(session, contact)
        })
    }

    /// Deletes a persisted contact and returns its final state.
    pub fn delete_contact(&self, contact: Contact) -> RepoResult<Contact> {
        run_in_scope(&self.db, ScopeOptions::write(), |session| {
            self.repo.delete_contact(session, contact)
        })
    }
}
