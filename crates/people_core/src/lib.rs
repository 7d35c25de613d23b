//! Core domain logic for the people registry.
//! This crate is the single source of truth for person invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod serializer;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::person::{NewPerson, Person, PersonId, PersonValidationError, NAME_MAX_CHARS};
pub use repo::person_repo::{PersonRepository, RepoError, RepoResult, SqlitePersonRepository};
pub use serializer::errors::ValidationErrors;
pub use serializer::person::PersonSerializer;
pub use service::person_service::{PersonService, PersonServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
