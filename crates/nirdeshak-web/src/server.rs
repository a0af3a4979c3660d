//! Main web server setup and startup.
//!
//! [`WebServer`] builds the upstream clients from a [`RelayConfig`],
//! composes the axum router and runs the HTTP listener until shutdown.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::Response;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use nirdeshak_relay::{ChatClient, RelayConfig, SpeechClient};

use crate::WebConfig;
use crate::api;
use crate::error::{INTERNAL_MESSAGE, error_body};
use crate::frontend;
use crate::state::AppState;

/// Upper bound on request bodies; audio uploads can be several MB.
const UPLOAD_LIMIT_BYTES: usize = 25 * 1024 * 1024;

/// The relay's HTTP server.
pub struct WebServer {
    config: WebConfig,
    state: Arc<AppState>,
    allowed_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    ///
    /// # Arguments
    ///
    /// * `config` - Bind address, port and static directory.
    /// * `relay` - Upstream credentials, endpoints, timeout and CORS origins.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn new(config: WebConfig, relay: &RelayConfig) -> nirdeshak_relay::Result<Self> {
        let chat = ChatClient::new(relay.chat.clone(), relay.upstream_timeout)?;
        let speech = relay
            .speech
            .clone()
            .map(|speech| SpeechClient::new(speech, relay.upstream_timeout))
            .transpose()?;

        let state = Arc::new(AppState {
            chat,
            speech,
            config: config.clone(),
        });

        Ok(Self {
            config,
            state,
            allowed_origins: relay.allowed_origins.clone(),
        })
    }

    /// Return the `host:port` string this server will bind to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.bind_addr, self.config.port)
    }

    /// Build the axum router with all routes registered.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(frontend::index))
            .route("/health", get(api::health))
            .route("/query", post(api::query))
            .route("/transcribe", post(api::transcribe))
            .route("/tts", post(api::tts))
            .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
            .layer(cors_layer(&self.allowed_origins))
            .layer(CatchPanicLayer::custom(panic_response))
            .with_state(Arc::clone(&self.state))
    }

    /// Bind the configured address and serve until Ctrl-C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot be bound.
    pub async fn start(self) -> std::io::Result<()> {
        let addr = self.addr();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(addr = %addr, "starting web server");
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("web server stopped");
        Ok(())
    }
}

/// CORS policy permitting only the configured frontend origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| {
            // Credentialed CORS cannot use a wildcard origin.
            let wildcard = origin.as_str() == "*";
            if wildcard {
                tracing::warn!("ignoring wildcard CORS origin, list origins explicitly");
            }
            !wildcard
        })
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// Last-resort handler: a panic inside a handler becomes a generic 500.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");
    error_body(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
