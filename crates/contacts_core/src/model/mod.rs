//! Domain model of the contact book.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every persisted contact is identified by a storage-assigned `ContactId`.
//! - Deletion is a hard delete; ids are not recycled.

pub mod contact;
