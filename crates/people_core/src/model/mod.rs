//! Domain model for the people registry.
//!
//! # Invariants
//! - Every stored person is identified by a store-assigned `PersonId`.
//! - Identifiers are never reassigned or reused.

pub mod person;
