//! Request middleware: host allowlist, HTTPS enforcement, access log.
//!
//! The service sits behind a TLS-terminating proxy, so the original scheme
//! and host arrive in `X-Forwarded-Proto` and `X-Forwarded-Host`.

use axum::extract::{Request, State};
use axum::http::header::{HOST, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{info, warn};
use std::time::Instant;

use crate::error::DetailBody;
use crate::server::{AppState, HEALTH_PATH};

const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Rejects requests whose host is not in `ALLOWED_HOSTS` with 400.
pub async fn check_host(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.uri().path() == HEALTH_PATH {
        return next.run(req).await;
    }

    let host = request_host(req.headers(), req.uri());
    let allowed = host
        .as_deref()
        .map(|host| host_allowed(host, &state.settings.allowed_hosts))
        .unwrap_or(false);

    if !allowed {
        warn!(
            "event=host_rejected module=server status=error host={}",
            host.as_deref().unwrap_or("<none>")
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(DetailBody::new("Invalid host header.")),
        )
            .into_response();
    }

    next.run(req).await
}

/// Redirects plain-HTTP requests to HTTPS with 301 (skipped in debug mode).
pub async fn enforce_https(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.settings.debug || req.uri().path() == HEALTH_PATH || is_secure(req.headers()) {
        return next.run(req).await;
    }

    let host = request_host(req.headers(), req.uri()).unwrap_or_default();
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|value| value.as_str())
        .unwrap_or("/");
    let location = format!("https://{host}{path_and_query}");

    match HeaderValue::from_str(&location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(LOCATION, value)]).into_response(),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(DetailBody::new("Invalid host header.")),
        )
            .into_response(),
    }
}

/// Logs one line per request with method, path, status and duration.
pub async fn log_request(req: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let status = response.status();
    info!(
        "event=http_request module=server status={} method={} path={} http_status={} duration_ms={}",
        if status.is_server_error() { "error" } else { "ok" },
        method,
        path,
        status.as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

/// Host the client asked for, lowercased and without port.
///
/// Prefers the first `X-Forwarded-Host` entry, then `Host`, then the URI authority.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let raw = headers
        .get(X_FORWARDED_HOST)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .or_else(|| headers.get(HOST).and_then(|value| value.to_str().ok()))
        .or_else(|| uri.authority().map(|authority| authority.as_str()))?;

    let host = strip_port(raw.trim()).trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Matches `host` against allowlist patterns.
///
/// `*` matches anything; `.example.com` matches `example.com` and any
/// subdomain; other patterns match exactly.
pub fn host_allowed(host: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        if pattern == "*" {
            return true;
        }
        match pattern.strip_prefix('.') {
            Some(domain) => host == domain || host.ends_with(pattern.as_str()),
            None => host == pattern.as_str(),
        }
    })
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal: keep the bracketed address.
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|ch| ch.is_ascii_digit()) => name,
        _ => host,
    }
}

fn is_secure(headers: &HeaderMap) -> bool {
    headers
        .get(X_FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}
