//! Boundary layer for the contact book.
//!
//! Maps core results onto the HTTP-shaped contract (status + JSON body)
//! without binding to a web framework.

pub mod api;

pub use api::{ApiResponse, ContactApi, ContactRequest};
