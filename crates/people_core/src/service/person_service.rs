//! Person use-case service.
//!
//! # Responsibility
//! - List all people.
//! - Validate untyped input, persist it, and return the stored representation.
//!
//! # Invariants
//! - Invalid input never reaches the repository (atomic reject).
//! - A successful create returns the row as read back from storage.

use crate::model::person::{NewPerson, Person};
use crate::repo::person_repo::{PersonRepository, RepoError, RepoResult};
use crate::serializer::errors::ValidationErrors;
use crate::serializer::person::PersonSerializer;
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for person use-cases.
#[derive(Debug)]
pub enum PersonServiceError {
    /// Input failed field validation; nothing was written.
    Invalid(ValidationErrors),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for PersonServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "invalid person input: {errors}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent person state: {details}"),
        }
    }
}

impl Error for PersonServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for PersonServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ValidationErrors> for PersonServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Invalid(value)
    }
}

/// Person service facade over repository implementations.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every stored person in storage order.
    pub fn list_people(&self) -> RepoResult<Vec<Person>> {
        self.repo.list_people()
    }

    /// Validates untyped input and creates one person from it.
    pub fn create_person(&self, data: &Value) -> Result<Person, PersonServiceError> {
        let candidate = match PersonSerializer::validate(data) {
            Ok(candidate) => candidate,
            Err(errors) => {
                warn!(
                    "event=person_create module=service status=rejected fields={}",
                    errors.fields().collect::<Vec<_>>().join(",")
                );
                return Err(errors.into());
            }
        };
        self.create_validated(&candidate)
    }

    /// Creates one person from an already validated candidate.
    pub fn create_validated(&self, candidate: &NewPerson) -> Result<Person, PersonServiceError> {
        let id = self.repo.create_person(candidate)?;
        let person = self
            .repo
            .get_person(id)?
            .ok_or(PersonServiceError::InconsistentState(
                "created person not found in read-back",
            ))?;

        info!("event=person_create module=service status=ok id={id}");
        Ok(person)
    }

    /// Counts stored people.
    pub fn count_people(&self) -> RepoResult<u64> {
        self.repo.count_people()
    }
}
