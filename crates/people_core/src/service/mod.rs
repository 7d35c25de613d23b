//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate serializer validation and repository calls into use-case APIs.
//! - Keep the HTTP layer decoupled from storage details.

pub mod person_service;
