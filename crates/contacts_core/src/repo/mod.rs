//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository operations run inside a session owned by the caller; they
//!   never commit, roll back or close it themselves.
//! - Repository APIs return semantic errors (`Validation`, `NotFound`) in
//!   addition to storage errors.

pub mod contact_repo;
