//! HTTP surface for the people service.
//!
//! # Responsibilities
//! - Read deployment settings from the environment.
//! - Serve list/create routes for the person resource as JSON.
//! - Apply host allowlist, HTTPS redirect, security headers and CORS.
//!
//! # Invariants
//! - Handlers never touch SQL directly; all storage goes through
//!   `people_core::PersonService`.
//! - Server errors never leak internals unless `DEBUG` is on.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod settings;

pub use error::{ApiError, DetailBody, GENERIC_SERVER_ERROR};
pub use server::{router, AppState, Server, ServerError, HEALTH_PATH};
pub use settings::{RouteLayout, SecretKey, Settings, SettingsError};
