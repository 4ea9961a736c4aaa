//! Use-case API for boundary callers (HTTP adapters, CLI).
//!
//! # Responsibility
//! - Expose the five contact endpoints as plain function calls.
//! - Translate core results into status codes and JSON bodies.
//!
//! # Invariants
//! - Calls never panic; every outcome is an `ApiResponse`.
//! - "Not found" is always 404 with `{"detail": "Contact not found"}`.
//! - Storage errors are logged and surfaced as an opaque 500.

use contacts_core::{
    Contact, ContactId, ContactRepository, ContactService, RepoError, RepoResult,
    SqliteContactRepository,
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_UNPROCESSABLE: u16 = 422;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

const CONTACT_NOT_FOUND: &str = "Contact not found";
const INTERNAL_ERROR: &str = "Internal Server Error";

/// Request body for create (`POST /contacts`) and update
/// (`PUT /contacts/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: String,
}

/// Status code plus JSON body, as an HTTP adapter would emit it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    fn detail(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "detail": detail.into() }),
        }
    }

    fn not_found() -> Self {
        Self::detail(STATUS_NOT_FOUND, CONTACT_NOT_FOUND)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Boundary over a [`ContactService`].
pub struct ContactApi<R: ContactRepository = SqliteContactRepository> {
    service: ContactService<R>,
}

impl<R: ContactRepository> ContactApi<R> {
    pub fn new(service: ContactService<R>) -> Self {
        Self { service }
    }

    /// `GET /contacts`
    pub fn list_contacts(&self) -> ApiResponse {
        respond("list_contacts", self.service.list_contacts(), |contacts| {
            contacts_body(&contacts)
        })
    }

    /// `GET /contacts/{id}`
    pub fn get_contact(&self, id: ContactId) -> ApiResponse {
        match self.service.get_contact(id) {
            Ok(Some(contact)) => ApiResponse::ok(contact_body(&contact)),
            Ok(None) => ApiResponse::not_found(),
            Err(err) => error_response("get_contact", err),
        }
    }

    /// `POST /contacts`
    pub fn create_contact(&self, request: &ContactRequest) -> ApiResponse {
        let result = self.service.create_contact(
            &request.name,
            &request.surname,
            &request.phone,
            &request.email,
        );
        respond("create_contact", result, |contact| contact_body(&contact))
    }

    /// `PUT /contacts/{id}`: loads, overwrites every field, persists.
    pub fn update_contact(&self, id: ContactId, request: &ContactRequest) -> ApiResponse {
        let mut contact = match self.load("update_contact", id) {
            Ok(contact) => contact,
            Err(response) => return response,
        };
        contact.name = request.name.clone();
        contact.surname = request.surname.clone();
        contact.phone = request.phone.clone();
        contact.email = request.email.clone();

        respond(
            "update_contact",
            self.service.update_contact(contact),
            |contact| contact_body(&contact),
        )
    }

    /// `DELETE /contacts/{id}`: responds with the contact as it was.
    pub fn delete_contact(&self, id: ContactId) -> ApiResponse {
        let contact = match self.load("delete_contact", id) {
            Ok(contact) => contact,
            Err(response) => return response,
        };
        respond(
            "delete_contact",
            self.service.delete_contact(contact),
            |contact| contact_body(&contact),
        )
    }

    fn load(&self, operation: &'static str, id: ContactId) -> Result<Contact, ApiResponse> {
        match self.service.get_contact(id) {
            Ok(Some(contact)) => Ok(contact),
            Ok(None) => Err(ApiResponse::not_found()),
            Err(err) => Err(error_response(operation, err)),
        }
    }
}

fn respond<T>(
    operation: &'static str,
    result: RepoResult<T>,
    to_body: impl FnOnce(T) -> Value,
) -> ApiResponse {
    match result {
        Ok(value) => ApiResponse::ok(to_body(value)),
        Err(err) => error_response(operation, err),
    }
}

fn error_response(operation: &'static str, err: RepoError) -> ApiResponse {
    match err {
        RepoError::Validation(err) => {
            warn!("event=api_request module=api op={operation} status=rejected error={err}");
            ApiResponse::detail(STATUS_UNPROCESSABLE, err.to_string())
        }
        // Row vanished between the lookup and the write.
        RepoError::NotFound(_) => ApiResponse::not_found(),
        other => {
            error!("event=api_request module=api op={operation} status=error error={other}");
            ApiResponse::detail(STATUS_INTERNAL_ERROR, INTERNAL_ERROR)
        }
    }
}

fn contact_body(contact: &Contact) -> Value {
    json!({
        "id": contact.id,
        "name": contact.name,
        "surname": contact.surname,
        "phone": contact.phone,
        "email": contact.email,
    })
}

fn contacts_body(contacts: &[Contact]) -> Value {
    Value::Array(contacts.iter().map(contact_body).collect())
}

#[cfg(test)]
mod tests {
    use super::{ApiResponse, ContactApi, ContactRequest};
    use contacts_core::{ContactService, DatabaseConfig};
    use serde_json::json;

    fn api() -> ContactApi {
        ContactApi::new(ContactService::open(&DatabaseConfig::in_memory()).unwrap())
    }

    fn ada_request() -> ContactRequest {
        ContactRequest {
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            phone: "555-123-4567".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn not_found() -> ApiResponse {
        ApiResponse {
            status: 404,
            body: json!({ "detail": "Contact not found" }),
        }
    }

    #[test]
    fn create_then_get_and_list() {
        let api = api();

        let created = api.create_contact(&ada_request());
        assert_eq!(created.status, 200);
        assert_eq!(
            created.body,
            json!({
                "id": 1,
                "name": "Ada",
                "surname": "Lovelace",
                "phone": "555-123-4567",
                "email": "ada@example.com"
            })
        );

        let fetched = api.get_contact(1);
        assert_eq!(fetched, created);

        let listed = api.list_contacts();
        assert!(listed.is_success());
        assert_eq!(listed.body, json!([created.body]));
    }

    #[test]
    fn missing_contact_maps_to_404_everywhere() {
        let api = api();

        assert_eq!(api.get_contact(999_999), not_found());
        assert_eq!(api.update_contact(999_999, &ada_request()), not_found());
        assert_eq!(api.delete_contact(999_999), not_found());
    }

    #[test]
    fn validation_errors_map_to_422_without_persisting() {
        let api = api();
        let mut request = ada_request();
        request.email = "not-an-email".to_string();

        let response = api.create_contact(&request);
        assert_eq!(response.status, 422);
        assert_eq!(response.body["detail"], "email address is not valid");
        assert_eq!(api.list_contacts().body, json!([]));
    }

    #[test]
    fn update_overwrites_fields_and_delete_returns_last_state() {
        let api = api();
        api.create_contact(&ada_request());

        let mut request = ada_request();
        request.surname = "King".to_string();
        let updated = api.update_contact(1, &request);
        assert_eq!(updated.status, 200);
        assert_eq!(updated.body["surname"], "King");

        let mut invalid = ada_request();
        invalid.phone = "abc".to_string();
        assert_eq!(api.update_contact(1, &invalid).status, 422);
        assert_eq!(api.get_contact(1).body["surname"], "King");

        let deleted = api.delete_contact(1);
        assert_eq!(deleted, updated);
        assert_eq!(api.get_contact(1), not_found());
    }

    #[test]
    fn request_body_deserializes_from_json() {
        let request: ContactRequest = serde_json::from_str(
            r#"{"name":"Ada","surname":"Lovelace","phone":"555-123-4567","email":"ada@example.com"}"#,
        )
        .unwrap();
        assert_eq!(request, ada_request());
    }
}
