//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the five contact units of work against an open [`Session`].
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Contact::validate()` before touching the session.
//! - "Not found" on lookup is `Ok(None)`, never an error.
//! - Every row read or written is tracked by the session until it detaches.

use crate::model::contact::{Contact, ContactId, ContactValidationError};
use crate::session::{Session, SessionError};
use rusqlite::{params, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACTS_TABLE: &str = "contacts";

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    name,
    surname,
    phone,
    email
FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Storage(SessionError),
    /// Update/delete targeted a row that no longer exists.
    NotFound(ContactId),
    /// Update/delete received a contact that was never persisted.
    NotPersisted,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::NotPersisted => write!(f, "contact has no id; create it first"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::NotPersisted | Self::InvalidData(_) => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SessionError> for RepoError {
    fn from(value: SessionError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(SessionError::from(value))
    }
}

/// Units of work over the `contacts` table.
pub trait ContactRepository {
    /// Returns every contact in storage order.
    fn list_contacts(&self, session: &mut Session<'_>) -> RepoResult<Vec<Contact>>;
    /// Returns the contact with `id`, or `None`.
    fn get_contact(&self, session: &mut Session<'_>, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Validates and inserts a new contact; the returned copy carries its id.
    fn create_contact(
        &self,
        session: &mut Session<'_>,
        name: &str,
        surname: &str,
        phone: &str,
        email: &str,
    ) -> RepoResult<Contact>;
    /// Writes the in-memory state of an already persisted contact.
    fn update_contact(&self, session: &mut Session<'_>, contact: Contact) -> RepoResult<Contact>;
    /// Removes a persisted contact and returns its last known state.
    fn delete_contact(&self, session: &mut Session<'_>, contact: Contact) -> RepoResult<Contact>;
}

/// SQLite-backed contact repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteContactRepository;

impl SqliteContactRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ContactRepository for SqliteContactRepository {
    fn list_contacts(&self, session: &mut Session<'_>) -> RepoResult<Vec<Contact>> {
        let conn = session.connection()?;
        let mut stmt = conn.prepare(CONTACT_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            let contact = parse_contact_row(row)?;
            track(session, &contact);
            contacts.push(contact);
        }

        Ok(contacts)
    }

    fn get_contact(&self, session: &mut Session<'_>, id: ContactId) -> RepoResult<Option<Contact>> {
        let conn = session.connection()?;
        let contact = conn
            .query_row(
                &format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_contact_row(row)),
            )
            .optional()?
            .transpose()?;

        if let Some(contact) = &contact {
            track(session, contact);
        }
        Ok(contact)
    }

    fn create_contact(
        &self,
        session: &mut Session<'_>,
        name: &str,
        surname: &str,
        phone: &str,
        email: &str,
    ) -> RepoResult<Contact> {
        let mut contact = Contact::new(name, surname, phone, email);
        contact.validate()?;

        let conn = session.connection()?;
        conn.execute(
            "INSERT INTO contacts (name, surname, phone, email) VALUES (?1, ?2, ?3, ?4);",
            params![
                contact.name.as_str(),
                contact.surname.as_str(),
                contact.phone.as_str(),
                contact.email.as_str(),
            ],
        )?;
        contact.id = Some(conn.last_insert_rowid());
        track(session, &contact);

        Ok(contact)
    }

    fn update_contact(&self, session: &mut Session<'_>, contact: Contact) -> RepoResult<Contact> {
        let id = contact.id.ok_or(RepoError::NotPersisted)?;
        contact.validate()?;

        let conn = session.connection()?;
        let changed = conn.execute(
            "UPDATE contacts
             SET
                name = ?1,
                surname = ?2,
                phone = ?3,
                email = ?4
             WHERE id = ?5;",
            params![
                contact.name.as_str(),
                contact.surname.as_str(),
                contact.phone.as_str(),
                contact.email.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        track(session, &contact);
        Ok(contact)
    }

    fn delete_contact(&self, session: &mut Session<'_>, contact: Contact) -> RepoResult<Contact> {
        let id = contact.id.ok_or(RepoError::NotPersisted)?;

        let conn = session.connection()?;
        let changed = conn.execute("DELETE FROM contacts WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        session.forget(CONTACTS_TABLE, id);
        Ok(contact)
    }
}

fn track(session: &mut Session<'_>, contact: &Contact) {
    if let Some(id) = contact.id {
        session.track(CONTACTS_TABLE, id);
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id: Option<ContactId> = row.get("id")?;
    let id = id.ok_or_else(|| RepoError::InvalidData("null value in contacts.id".to_string()))?;

    Ok(Contact {
        id: Some(id),
        name: row.get("name")?,
        surname: row.get("surname")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
    })
}
