//! Validation and encoding boundary between external JSON and stored records.
//!
//! # Responsibility
//! - Turn untyped request input into validated insert candidates.
//! - Report every failing field with client-facing messages.
//!
//! # Invariants
//! - A candidate is produced only when no field failed.
//! - Error maps preserve field declaration order.

pub mod errors;
pub mod person;
