//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `NewPerson::validate()` before persistence.
//! - Read paths reject invalid persisted rows instead of masking them.

pub mod person_repo;
