//! Deployment settings read from the environment.
//!
//! Recognized variables: `DEBUG`, `SECRET_KEY`, `ALLOWED_HOSTS`,
//! `DATABASE_URL`, `FRONTEND_URL`, `ROUTE_LAYOUT`, `API_PREFIX`, `HOST`,
//! `PORT`, `LOG_LEVEL`. `SECRET_KEY` and `DATABASE_URL` have no default.

use axum::http::HeaderValue;
use figment::providers::Env;
use people_core::db::{parse_database_url, DbTarget};
use people_core::logging::normalize_level;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Environment variables consulted by [`Settings::from_env`].
pub const ENV_KEYS: &[&str] = &[
    "DEBUG",
    "SECRET_KEY",
    "ALLOWED_HOSTS",
    "DATABASE_URL",
    "FRONTEND_URL",
    "ROUTE_LAYOUT",
    "API_PREFIX",
    "HOST",
    "PORT",
    "LOG_LEVEL",
];

pub const DEFAULT_ALLOWED_HOSTS: &[&str] =
    &[".run.app", ".googleapis.com", "localhost", "127.0.0.1"];
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Which URL table serves the person resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteLayout {
    /// `GET` and `POST` on `/person/`.
    #[default]
    Combined,
    /// `GET /person/` and `POST /person/create/`.
    Split,
}

impl FromStr for RouteLayout {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(Self::Combined),
            "split" => Ok(Self::Split),
            other => Err(format!("expected combined|split, got `{other}`")),
        }
    }
}

impl Display for RouteLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Combined => write!(f, "combined"),
            Self::Split => write!(f, "split"),
        }
    }
}

/// Signing key; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey(<redacted>)")
    }
}

/// Resolved server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Verbose 500 bodies; no HTTPS redirect, no HSTS.
    pub debug: bool,
    pub secret_key: SecretKey,
    /// Lowercased host patterns; `.example.com` also matches subdomains.
    pub allowed_hosts: Vec<String>,
    pub database: DbTarget,
    /// Sole CORS origin, without trailing slash.
    pub frontend_origin: HeaderValue,
    pub route_layout: RouteLayout,
    /// Empty, or `/segment` without trailing slash.
    pub api_prefix: String,
    pub bind_addr: SocketAddr,
    pub log_level: &'static str,
}

impl Settings {
    /// Production-shaped defaults around the two values that have none.
    pub fn new(secret_key: SecretKey, database: DbTarget) -> Self {
        Self {
            debug: false,
            secret_key,
            allowed_hosts: DEFAULT_ALLOWED_HOSTS
                .iter()
                .map(|host| host.to_string())
                .collect(),
            database,
            frontend_origin: HeaderValue::from_static(DEFAULT_FRONTEND_URL),
            route_layout: RouteLayout::default(),
            api_prefix: String::new(),
            bind_addr: SocketAddr::new(DEFAULT_HOST, DEFAULT_PORT),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }

    /// Loads settings from process environment variables.
    ///
    /// Values are taken verbatim; `00123` stays `00123`.
    pub fn from_env() -> Result<Self, SettingsError> {
        let env = Env::raw().only(ENV_KEYS);
        let pairs = env
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), value));
        Self::from_raw(RawSettings::from_pairs(pairs))
    }

    /// Validates raw values and applies defaults.
    pub fn from_raw(raw: RawSettings) -> Result<Self, SettingsError> {
        let secret_key = match raw.secret_key {
            Some(value) if !value.trim().is_empty() => SecretKey::new(value),
            _ => return Err(SettingsError::Missing("SECRET_KEY")),
        };

        let database = match raw.database_url {
            Some(value) if !value.trim().is_empty() => parse_database_url(&value)
                .map_err(|err| SettingsError::invalid("DATABASE_URL", err))?,
            _ => return Err(SettingsError::Missing("DATABASE_URL")),
        };

        let mut settings = Self::new(secret_key, database);

        if let Some(value) = non_empty(raw.debug) {
            settings.debug =
                parse_flag(&value).map_err(|err| SettingsError::invalid("DEBUG", err))?;
        }
        if let Some(value) = non_empty(raw.allowed_hosts) {
            settings.allowed_hosts = parse_host_list(&value);
        }
        if let Some(value) = non_empty(raw.frontend_url) {
            settings.frontend_origin =
                parse_origin(&value).map_err(|err| SettingsError::invalid("FRONTEND_URL", err))?;
        }
        if let Some(value) = non_empty(raw.route_layout) {
            settings.route_layout = value
                .parse()
                .map_err(|err| SettingsError::invalid("ROUTE_LAYOUT", err))?;
        }
        if let Some(value) = non_empty(raw.api_prefix) {
            settings.api_prefix =
                normalize_prefix(&value).map_err(|err| SettingsError::invalid("API_PREFIX", err))?;
        }
        if let Some(value) = non_empty(raw.host) {
            let ip = value
                .trim()
                .parse::<IpAddr>()
                .map_err(|err| SettingsError::invalid("HOST", err))?;
            settings.bind_addr.set_ip(ip);
        }
        if let Some(value) = non_empty(raw.port) {
            let port = value
                .trim()
                .parse::<u16>()
                .map_err(|err| SettingsError::invalid("PORT", err))?;
            settings.bind_addr.set_port(port);
        }
        if let Some(value) = non_empty(raw.log_level) {
            settings.log_level =
                normalize_level(&value).map_err(|err| SettingsError::invalid("LOG_LEVEL", err))?;
        }

        Ok(settings)
    }

    /// Path of the list route, e.g. `/api/person/`.
    pub fn list_path(&self) -> String {
        format!("{}/person/", self.api_prefix)
    }

    /// Path of the create route for the active layout.
    pub fn create_path(&self) -> String {
        match self.route_layout {
            RouteLayout::Combined => self.list_path(),
            RouteLayout::Split => format!("{}/person/create/", self.api_prefix),
        }
    }
}

/// Unvalidated values keyed by lowercase variable name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawSettings {
    pub debug: Option<String>,
    pub secret_key: Option<String>,
    pub allowed_hosts: Option<String>,
    pub database_url: Option<String>,
    pub frontend_url: Option<String>,
    pub route_layout: Option<String>,
    pub api_prefix: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub log_level: Option<String>,
}

impl RawSettings {
    /// Collects `(key, value)` pairs; keys match case-insensitively, unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut raw = Self::default();
        for (key, value) in pairs {
            let slot = match key.to_ascii_lowercase().as_str() {
                "debug" => &mut raw.debug,
                "secret_key" => &mut raw.secret_key,
                "allowed_hosts" => &mut raw.allowed_hosts,
                "database_url" => &mut raw.database_url,
                "frontend_url" => &mut raw.frontend_url,
                "route_layout" => &mut raw.route_layout,
                "api_prefix" => &mut raw.api_prefix,
                "host" => &mut raw.host,
                "port" => &mut raw.port,
                "log_level" => &mut raw.log_level,
                _ => continue,
            };
            *slot = Some(value);
        }
        raw
    }
}

/// Configuration problems, each naming the offending variable.
#[derive(Debug)]
pub enum SettingsError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
}

impl SettingsError {
    fn invalid(key: &'static str, err: impl Display) -> Self {
        Self::Invalid {
            key,
            message: err.to_string(),
        }
    }
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting {key}"),
            Self::Invalid { key, message } => write!(f, "invalid value for {key}: {message}"),
        }
    }
}

impl Error for SettingsError {}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Parses a boolean the way deployment tooling writes them.
pub fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "y" | "t" => Ok(true),
        "0" | "false" | "no" | "off" | "n" | "f" => Ok(false),
        other => Err(format!("expected a boolean, got `{other}`")),
    }
}

fn parse_host_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|host| host.trim().to_ascii_lowercase())
        .filter(|host| !host.is_empty())
        .collect()
}

fn parse_origin(value: &str) -> Result<HeaderValue, String> {
    let origin = value.trim().trim_end_matches('/');
    if !(origin.starts_with("http://") || origin.starts_with("https://")) {
        return Err(format!(
            "origin must start with http:// or https://, got `{origin}`"
        ));
    }
    HeaderValue::from_str(origin).map_err(|err| err.to_string())
}

fn normalize_prefix(value: &str) -> Result<String, String> {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.contains(|ch: char| ch.is_whitespace() || "{}:*".contains(ch)) {
        return Err(format!(
            "prefix `{trimmed}` contains characters not allowed in a path"
        ));
    }
    Ok(format!("/{trimmed}"))
}
