use contacts_core::{
    Contact, ContactRepository, ContactService, ContactValidationError, Database,
    DatabaseConfig, RepoError, RepoResult, Session, SqliteContactRepository,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn in_memory_service() -> ContactService {
    ContactService::open(&DatabaseConfig::in_memory()).unwrap()
}

fn create_ada(service: &ContactService) -> Contact {
    service
        .create_contact("Ada", "Lovelace", "555-123-4567", "ada@example.com")
        .unwrap()
}

#[test]
fn create_assigns_id_and_get_returns_equal_contact() {
    let service = in_memory_service();

    let created = create_ada(&service);
    let id = created.id.expect("created contact must carry an id");

    let loaded = service.get_contact(id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_with_invalid_email_fails_without_persisting() {
    let service = in_memory_service();
    create_ada(&service);

    let err = service
        .create_contact("Bad", "Email", "555-123-4567", "not-an-email")
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Validation(ContactValidationError::InvalidEmail)
    ));
    assert_eq!(service.list_contacts().unwrap().len(), 1);
}

#[test]
fn create_with_invalid_phone_fails_without_persisting() {
    let service = in_memory_service();

    let err = service
        .create_contact("Bad", "Phone", "abc", "bad.phone@example.com")
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Validation(ContactValidationError::InvalidPhone)
    ));
    assert!(service.list_contacts().unwrap().is_empty());
}

#[test]
fn failed_validation_leaves_the_scope_untouched() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteContactRepository::new();
    let conn = db.checkout().unwrap();
    let mut session = Session::begin(&conn, contacts_core::ScopeMode::Write).unwrap();

    let err = repo
        .create_contact(&mut session, "Bad", "Phone", "abc", "bad@example.com")
        .unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(session.tracked_len(), 0);
    assert_eq!(session.state(), contacts_core::SessionState::Open);
    let rows: i64 = session
        .connection()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn get_missing_id_returns_none() {
    let service = in_memory_service();

    assert_eq!(service.get_contact(999_999).unwrap(), None);
}

#[test]
fn update_then_get_returns_updated_fields() {
    let service = in_memory_service();
    let mut contact = create_ada(&service);

    contact.name = "Augusta Ada".to_string();
    contact.surname = "King".to_string();
    contact.phone = "+44 555 765 4321".to_string();
    contact.email = "countess@lovelace.org".to_string();
    let updated = service.update_contact(contact.clone()).unwrap();
    assert_eq!(updated, contact);

    let loaded = service.get_contact(contact.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded, contact);
}

#[test]
fn update_validates_before_writing() {
    let service = in_memory_service();
    let original = create_ada(&service);

    let mut invalid = original.clone();
    invalid.email = "nope".to_string();
    let err = service.update_contact(invalid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let loaded = service.get_contact(original.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn update_and_delete_reject_transient_contacts() {
    let service = in_memory_service();
    let transient = Contact::new("Ada", "Lovelace", "555-123-4567", "ada@example.com");

    assert!(matches!(
        service.update_contact(transient.clone()),
        Err(RepoError::NotPersisted)
    ));
    assert!(matches!(
        service.delete_contact(transient),
        Err(RepoError::NotPersisted)
    ));
}

#[test]
fn delete_then_get_returns_none() {
    let service = in_memory_service();
    let contact = create_ada(&service);
    let id = contact.id.unwrap();

    let deleted = service.delete_contact(contact.clone()).unwrap();
    assert_eq!(deleted, contact);
    assert_eq!(service.get_contact(id).unwrap(), None);

    assert!(matches!(
        service.delete_contact(contact.clone()),
        Err(RepoError::NotFound(missing)) if missing == id
    ));
    assert!(matches!(
        service.update_contact(contact),
        Err(RepoError::NotFound(missing)) if missing == id
    ));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let service = in_memory_service();
    let first = create_ada(&service);
    service.delete_contact(first.clone()).unwrap();

    let second = create_ada(&service);
    assert!(second.id.unwrap() > first.id.unwrap());
}

#[test]
fn create_list_delete_scenario() {
    let service = in_memory_service();

    let ada = create_ada(&service);
    assert_eq!(ada.id, Some(1));
    assert_eq!(service.list_contacts().unwrap(), vec![ada.clone()]);

    service.delete_contact(ada).unwrap();
    assert!(service.list_contacts().unwrap().is_empty());
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig::file(dir.path().join("contacts.db"));

    let created = {
        let service = ContactService::open(&config).unwrap();
        create_ada(&service)
    };

    let reopened = ContactService::open(&config).unwrap();
    assert_eq!(reopened.list_contacts().unwrap(), vec![created]);
}

/// Runs creates interleaved with full listings from several threads and
/// returns every assigned id.
fn run_mixed_workload(
    service: &Arc<ContactService>,
    workers: usize,
    per_worker: usize,
) -> HashSet<i64> {
    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let service = Arc::clone(service);
            thread::spawn(move || {
                (0..per_worker)
                    .map(|n| {
                        let id = service
                            .create_contact(
                                &format!("Worker{worker}"),
                                &format!("Entry{n}"),
                                "555-123-4567",
                                "worker@example.com",
                            )
                            .unwrap()
                            .id
                            .unwrap();
                        service.list_contacts().unwrap();
                        id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn concurrent_scopes_on_a_file_store_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig::file(dir.path().join("contacts.db"));
    let service = Arc::new(ContactService::open(&config).unwrap());

    let ids = run_mixed_workload(&service, 8, 50);

    assert_eq!(ids.len(), 400);
    assert_eq!(service.list_contacts().unwrap().len(), 400);
}

#[test]
fn concurrent_scopes_on_an_in_memory_store_all_succeed() {
    let service = Arc::new(in_memory_service());

    let ids = run_mixed_workload(&service, 8, 50);

    assert_eq!(ids.len(), 400);
    assert_eq!(service.list_contacts().unwrap().len(), 400);
}

/// Delegates to SQLite but fails every update after touching the row.
struct FailingUpdateRepository {
    inner: SqliteContactRepository,
}

impl ContactRepository for FailingUpdateRepository {
    fn list_contacts(&self, session: &mut Session<'_>) -> RepoResult<Vec<Contact>> {
        self.inner.list_contacts(session)
    }

    fn get_contact(&self, session: &mut Session<'_>, id: i64) -> RepoResult<Option<Contact>> {
        self.inner.get_contact(session, id)
    }

    fn create_contact(
        &self,
        session: &mut Session<'_>,
        name: &str,
        surname: &str,
        phone: &str,
        email: &str,
    ) -> RepoResult<Contact> {
        self.inner
            .create_contact(session, name, surname, phone, email)
    }

    fn update_contact(&self, session: &mut Session<'_>, contact: Contact) -> RepoResult<Contact> {
        self.inner.update_contact(session, contact)?;
        Err(RepoError::InvalidData("simulated failure".to_string()))
    }

    fn delete_contact(&self, session: &mut Session<'_>, contact: Contact) -> RepoResult<Contact> {
        self.inner.delete_contact(session, contact)
    }
}

#[test]
fn failing_unit_of_work_leaves_no_partial_update() {
    let service = ContactService::new(
        Database::open_in_memory().unwrap(),
        FailingUpdateRepository {
            inner: SqliteContactRepository::new(),
        },
    );
    let original = service
        .create_contact("Ada", "Lovelace", "555-123-4567", "ada@example.com")
        .unwrap();

    let mut changed = original.clone();
    changed.surname = "Byron".to_string();
    let err = service.update_contact(changed).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    let loaded = service.get_contact(original.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded, original);
    assert_eq!(service.database().idle_count(), 1);
}
