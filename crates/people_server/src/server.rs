//! HTTP server for the person resource.
//!
//! Layer order, outermost first: access log, security headers, host
//! allowlist, HTTPS redirect, CORS, routes.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::header::{
    HeaderName, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN, STRICT_TRANSPORT_SECURITY,
    USER_AGENT, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use log::{error, info, warn};
use people_core::db::{open_target, DbError};
use people_core::{PersonService, SqlitePersonRepository};
use rusqlite::Connection;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::ApiError;
use crate::handlers::{create_person, health, list_people, method_not_allowed};
use crate::middleware::{check_host, enforce_https, log_request};
use crate::settings::{RouteLayout, Settings};

pub const HEALTH_PATH: &str = "/health";

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps an open, migrated connection.
    pub fn new(settings: Settings, conn: Connection) -> Self {
        Self {
            settings: Arc::new(settings),
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `op` against a person service on the blocking pool.
    ///
    /// The connection lock is held for the whole of `op`.
    pub async fn with_service<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&PersonService<SqlitePersonRepository<'_>>) -> Result<T, ApiError>
            + Send
            + 'static,
    {
        let db = Arc::clone(&self.db);
        let expose = self.settings.debug;
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::internal("database connection lock poisoned", expose))?;
            let service = PersonService::new(SqlitePersonRepository::new(&conn));
            op(&service)
        })
        .await
        .map_err(|err| ApiError::internal(format!("blocking task failed: {err}"), expose))?
    }
}

/// Builds the full router for `state`.
pub fn router(state: AppState) -> Router {
    let settings = Arc::clone(&state.settings);

    let resource_routes = match settings.route_layout {
        RouteLayout::Combined => Router::new().route(
            &settings.list_path(),
            get(list_people).post(create_person),
        ),
        RouteLayout::Split => Router::new()
            .route(&settings.list_path(), get(list_people))
            .route(&settings.create_path(), post(create_person)),
    };

    let mut router = resource_routes
        .route(HEALTH_PATH, get(health))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state.clone())
        .layer(cors_layer(&settings))
        .layer(from_fn_with_state(state.clone(), enforce_https))
        .layer(from_fn_with_state(state, check_host));

    router = router
        .layer(SetResponseHeaderLayer::if_not_present(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("same-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ));

    if !settings.debug {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            STRICT_TRANSPORT_SECURITY,
            // One year.
            HeaderValue::from_static("max-age=31536000; includeSubDomains; preload"),
        ));
    }

    router.layer(from_fn(log_request))
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([settings.frontend_origin.clone()]))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            ACCEPT,
            AUTHORIZATION,
            CONTENT_TYPE,
            ORIGIN,
            USER_AGENT,
            HeaderName::from_static("x-csrftoken"),
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(CORS_MAX_AGE)
}

/// Errors that stop the server from starting or serving.
#[derive(Debug)]
pub enum ServerError {
    Db(DbError),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Io(err) => write!(f, "server io error: {err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// The HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Opens the configured store (applying migrations) and prepares the server.
    pub fn from_settings(settings: Settings) -> Result<Self, ServerError> {
        let conn = open_target(&settings.database)?;
        Ok(Self {
            state: AppState::new(settings, conn),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serves until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or serving fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let settings = Arc::clone(&self.state.settings);
        let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;

        info!(
            "event=server_start module=server status=ok addr={} debug={} layout={} list_path={} create_path={}",
            settings.bind_addr,
            settings.debug,
            settings.route_layout,
            settings.list_path(),
            settings.create_path()
        );
        if settings.debug {
            warn!("event=server_start module=server status=warn debug=true error_detail=exposed");
        }

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("event=server_stop module=server status=ok");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("event=signal_install module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("event=shutdown module=server status=start signal=ctrl_c"),
        () = terminate => info!("event=shutdown module=server status=start signal=sigterm"),
    }
}
