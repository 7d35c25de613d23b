//! HTTP error mapping.
//!
//! Client errors carry their own body; server errors are logged and rendered
//! as a generic message unless the server runs in debug mode.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use people_core::{PersonServiceError, RepoError, ValidationErrors};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const GENERIC_SERVER_ERROR: &str = "A server error occurred.";

/// Error body for non-validation failures: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct DetailBody {
    pub detail: String,
}

impl DetailBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Request-level failure rendered as an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// Field validation failed (400, field map body).
    Validation(ValidationErrors),
    /// Request could not be interpreted (400, detail body).
    BadRequest(String),
    /// Body media type is not JSON (415).
    UnsupportedMediaType(String),
    /// Known path, unsupported method (405).
    MethodNotAllowed(String),
    /// Infrastructure failure (500). `expose` puts `message` in the body.
    Internal { message: String, expose: bool },
}

impl ApiError {
    pub fn internal(message: impl Into<String>, expose: bool) -> Self {
        Self::Internal {
            message: message.into(),
            expose,
        }
    }

    /// Maps a service failure: invalid input is a client error, the rest is internal.
    pub fn from_service(err: PersonServiceError, expose: bool) -> Self {
        match err {
            PersonServiceError::Invalid(errors) => Self::Validation(errors),
            other => Self::internal(other.to_string(), expose),
        }
    }

    pub fn from_repo(err: RepoError, expose: bool) -> Self {
        Self::internal(err.to_string(), expose)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation failed: {errors}"),
            Self::BadRequest(detail) => write!(f, "bad request: {detail}"),
            Self::UnsupportedMediaType(media_type) => {
                write!(f, "unsupported media type `{media_type}`")
            }
            Self::MethodNotAllowed(method) => write!(f, "method `{method}` not allowed"),
            Self::Internal { message, .. } => write!(f, "internal error: {message}"),
        }
    }
}

impl Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(errors) => (status, Json(errors)).into_response(),
            Self::BadRequest(detail) => (status, Json(DetailBody::new(detail))).into_response(),
            Self::UnsupportedMediaType(media_type) => (
                status,
                Json(DetailBody::new(format!(
                    "Unsupported media type \"{media_type}\" in request."
                ))),
            )
                .into_response(),
            Self::MethodNotAllowed(method) => (
                status,
                Json(DetailBody::new(format!("Method \"{method}\" not allowed."))),
            )
                .into_response(),
            Self::Internal { message, expose } => {
                error!(
                    "event=http_error module=server status=error http_status={} error={}",
                    status.as_u16(),
                    message
                );
                let detail = if expose {
                    format!("{GENERIC_SERVER_ERROR} {message}")
                } else {
                    GENERIC_SERVER_ERROR.to_string()
                };
                (status, Json(DetailBody::new(detail))).into_response()
            }
        }
    }
}
