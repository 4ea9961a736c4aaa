//! Core use-case services.
//!
//! # Responsibility
//! - Bind repository units of work to session scopes.
//! - Keep boundary layers decoupled from storage details.

pub mod contact_service;
