//! HTTP gateway for tmpup: route table, handlers and axum wiring.

/// Route handlers.
pub mod handlers;
/// Request shape consumed by the dispatcher.
pub mod request;
/// Response construction and status helpers.
pub mod response;
/// Regular-expression route dispatcher.
pub mod router;
/// Route table of the daemon.
pub mod routes;
/// HTML rendering.
pub mod templates;

pub use request::{Field, Request};
pub use response::{Mime, Response};
pub use router::{Dispatcher, Method, RouteError};
pub use tmpup_core::{config, AppError, Config, Connection, OpenMode, DEFAULT_PORT};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, StatusCode},
    Router,
};
use hyper::HeaderMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// State handed to every handler.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
}

impl AppContext {
    /// Open a fresh connection to the configured database.
    ///
    /// # Errors
    /// Returns [`AppError::Storage`] when the database cannot be opened.
    pub fn open(&self, mode: OpenMode) -> Result<Connection, AppError> {
        Connection::open(&self.config.db_path, mode).map_err(|err| {
            tracing::warn!("unable to open database {}: {}", self.config.db_path, err);
            AppError::from(err)
        })
    }
}

/// Shared state of the axum fallback service.
#[derive(Debug, Clone)]
pub struct AppState {
    pub ctx: AppContext,
    pub dispatcher: Arc<Dispatcher<AppContext>>,
}

impl AppState {
    /// Construct shared application state with the daemon's route table.
    ///
    /// # Errors
    /// Returns [`RouteError`] when a route pattern fails to compile.
    pub fn new(config: Config) -> Result<Self, RouteError> {
        Ok(Self {
            ctx: AppContext {
                config: Arc::new(config),
            },
            dispatcher: Arc::new(routes::build()?),
        })
    }
}

async fn dispatch(State(state): State<AppState>, req: axum::extract::Request) -> Response {
    let mime = if request::wants_json(req.uri().path(), req.headers()) {
        Mime::Json
    } else {
        Mime::Html
    };
    let request = match Request::from_http(req, state.ctx.config.max_upload_size).await {
        Ok(request) => request,
        Err(err) => return Response::from_error(&err, mime),
    };

    let worker = tokio::task::spawn_blocking(move || {
        state.dispatcher.process(&state.ctx, &request)
    });
    match worker.await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("request worker failed: {}", err);
            Response::status(StatusCode::INTERNAL_SERVER_ERROR, mime)
        }
    }
}

/// Create the application router with the dispatcher and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
///
/// # Returns
/// Configured `axum::Router`.
pub fn create_app(state: AppState) -> Router {
    // Security headers applied to every response
    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    default_headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    default_headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; style-src 'self'; img-src 'self' data:; frame-ancestors 'none'; base-uri 'self'; form-action 'self'",
        ),
    );

    let body_limit = state.ctx.config.max_upload_size;
    let mut app = Router::new().fallback(dispatch).with_state(state);
    for (name, value) in default_headers {
        if let Some(name) = name {
            app = app.layer(SetResponseHeaderLayer::overriding(name, value));
        }
    }

    app.layer(
        tower::ServiceBuilder::new()
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(TraceLayer::new_for_http()),
    )
}

/// Pick the address tmpupd listens on.
///
/// `bind` is the raw `BIND` override. Without `allow_public_access` any
/// non-loopback request is pinned back to `127.0.0.1` on the same port.
pub fn resolve_bind_address(
    config: &Config,
    bind: Option<&str>,
    allow_public_access: bool,
) -> SocketAddr {
    let loopback = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = bind.map_or(loopback, |raw| {
        raw.trim().parse::<SocketAddr>().unwrap_or_else(|err| {
            tracing::warn!("ignoring BIND '{}' ({}), listening on {}", raw, err, loopback);
            loopback
        })
    });

    if requested.ip().is_loopback() || allow_public_access {
        return requested;
    }
    tracing::warn!(
        "refusing public bind {} (set ALLOW_PUBLIC_ACCESS=1 to allow), using loopback",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

/// Run the axum server with graceful shutdown support.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
}
