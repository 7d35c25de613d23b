//! Route handlers for the person resource and health probe.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::Json;
use people_core::Person;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::server::AppState;

const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /person/: every stored person, in storage order.
pub async fn list_people(State(state): State<AppState>) -> Result<Json<Vec<Person>>, ApiError> {
    let expose = state.settings.debug;
    let people = state
        .with_service(move |service| {
            service
                .list_people()
                .map_err(|err| ApiError::from_repo(err, expose))
        })
        .await?;
    Ok(Json(people))
}

/// POST /person/ (or /person/create/): validate, store, return with 201.
pub async fn create_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    let data = parse_json_body(&headers, &body)?;
    let expose = state.settings.debug;
    let person = state
        .with_service(move |service| {
            service
                .create_person(&data)
                .map_err(|err| ApiError::from_service(err, expose))
        })
        .await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// Fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}

/// Decodes a request body into untyped JSON.
///
/// - No body, or no `Content-Type`: empty object.
/// - `Content-Type` other than `application/json`: 415.
/// - Malformed JSON: 400 with the parser message.
pub fn parse_json_body(headers: &HeaderMap, body: &[u8]) -> Result<Value, ApiError> {
    let Some(content_type) = headers.get(CONTENT_TYPE) else {
        return Ok(Value::Object(Map::new()));
    };
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    let raw_type = String::from_utf8_lossy(content_type.as_bytes()).into_owned();
    let media_type = raw_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if media_type != JSON_MEDIA_TYPE {
        return Err(ApiError::UnsupportedMediaType(raw_type));
    }

    serde_json::from_slice(body)
        .map_err(|err| ApiError::BadRequest(format!("JSON parse error - {err}")))
}
