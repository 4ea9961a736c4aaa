use contacts_core::model::contact::{is_valid_email, is_valid_phone, MAX_FIELD_CHARS};
use contacts_core::{Contact, ContactValidationError};

fn ada() -> Contact {
    Contact::new("Ada", "Lovelace", "555-123-4567", "ada@example.com")
}

#[test]
fn new_contact_is_transient_and_valid() {
    let contact = ada();
    assert_eq!(contact.id, None);
    assert!(!contact.is_persisted());
    contact.validate().unwrap();
}

#[test]
fn email_pattern_accepts_dotted_locals_and_subdomains() {
    for email in [
        "ada@example.com",
        "ada.lovelace@mail.example.org",
        "a_b@host-name.io",
    ] {
        assert!(is_valid_email(email), "{email} should be valid");
    }
    for email in [
        "not-an-email",
        "ada@example",
        "ada@example.c",
        "ada@example.museum",
        "ada+tag@example.com",
        "@example.com",
    ] {
        assert!(!is_valid_email(email), "{email} should be rejected");
    }
}

#[test]
fn phone_pattern_accepts_grouped_numbers_with_country_code_and_extension() {
    for phone in [
        "555-123-4567",
        "(555) 123-4567",
        "555.123.4567",
        "5551234567",
        "+1 555 123 4567",
        "+39-555-123-4567",
        "555-123-4567 x89",
        "  555 123 4567  ",
    ] {
        assert!(is_valid_phone(phone), "{phone} should be valid");
    }
    for phone in ["abc", "123-4567", "555-123-456", "555-123-4567 ext 12", ""] {
        assert!(!is_valid_phone(phone), "{phone} should be rejected");
    }
}

#[test]
fn validation_checks_email_before_phone() {
    let mut contact = ada();
    contact.email = "not-an-email".to_string();
    contact.phone = "abc".to_string();
    assert_eq!(
        contact.validate(),
        Err(ContactValidationError::InvalidEmail)
    );

    contact.email = "ada@example.com".to_string();
    assert_eq!(
        contact.validate(),
        Err(ContactValidationError::InvalidPhone)
    );
}

#[test]
fn validation_enforces_column_width() {
    let mut contact = ada();
    contact.surname = "x".repeat(MAX_FIELD_CHARS + 1);

    let err = contact.validate().unwrap_err();
    assert_eq!(
        err,
        ContactValidationError::FieldTooLong {
            field: "surname",
            max_chars: MAX_FIELD_CHARS,
            actual_chars: MAX_FIELD_CHARS + 1,
        }
    );
    assert!(err.to_string().contains("surname"));

    contact.surname = "é".repeat(MAX_FIELD_CHARS);
    contact.validate().unwrap();
}

#[test]
fn contact_serializes_with_nullable_id() {
    let json = serde_json::to_value(ada()).unwrap();
    assert_eq!(json["id"], serde_json::Value::Null);
    assert_eq!(json["email"], "ada@example.com");

    let parsed: Contact = serde_json::from_value(serde_json::json!({
        "id": 7,
        "name": "Ada",
        "surname": "Lovelace",
        "phone": "555-123-4567",
        "email": "ada@example.com"
    }))
    .unwrap();
    assert_eq!(parsed.id, Some(7));
}
