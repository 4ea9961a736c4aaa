//! Contact domain model.
//!
//! # Responsibility
//! - Define the single persisted record of the contact book.
//! - Own the field validation policy (email, phone, column width).
//!
//! # Invariants
//! - `id` is `None` until the storage layer assigns it at creation.
//! - An assigned `id` never changes and is never reused after deletion.
//! - Instances handed to callers are detached copies, not live rows.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned contact identifier (`contacts.id`).
pub type ContactId = i64;

/// Column width of every text field in the `contacts` table.
pub const MAX_FIELD_CHARS: usize = 50;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.]+@([\w-]+\.)+[\w-]{2,4}$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:\+?(\d{1,3}))?[-. (]*(\d{3})[-. )]*(\d{3})[-. ]*(\d{4})(?: *x(\d+))?\s*$",
    )
    .expect("valid phone regex")
});

/// A person in the contact book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// `None` while transient, `Some` once the row exists.
    pub id: Option<ContactId>,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: String,
}

impl Contact {
    /// Creates a transient contact. No validation happens here.
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            surname: surname.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    /// Returns whether the storage layer already assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Validates field formats and widths.
    ///
    /// Email is checked first, then phone, then column widths in table order.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if !is_valid_email(&self.email) {
            return Err(ContactValidationError::InvalidEmail);
        }
        if !is_valid_phone(&self.phone) {
            return Err(ContactValidationError::InvalidPhone);
        }

        for (field, value) in [
            ("name", &self.name),
            ("surname", &self.surname),
            ("phone", &self.phone),
            ("email", &self.email),
        ] {
            let actual_chars = value.chars().count();
            if actual_chars > MAX_FIELD_CHARS {
                return Err(ContactValidationError::FieldTooLong {
                    field,
                    max_chars: MAX_FIELD_CHARS,
                    actual_chars,
                });
            }
        }

        Ok(())
    }
}

/// Returns whether `value` looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Returns whether `value` looks like a (North-American grouped) phone number.
///
/// Accepts an optional `+` and 1-3 digit country code and an optional
/// `x<digits>` extension.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Validation failures for contact fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    InvalidEmail,
    InvalidPhone,
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::InvalidPhone => write!(f, "phone number is not valid"),
            Self::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} is {actual_chars} characters long; at most {max_chars} allowed"
            ),
        }
    }
}

impl Error for ContactValidationError {}
