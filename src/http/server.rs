//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding routes
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener, one task per connection via `axum::serve`
//! - Stop accepting on shutdown signal

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::forward::{Forwarder, SetupError};
use crate::observability::{NoopLogger, RequestLogger, TracingLogger};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server. Request logging follows
    /// `observability.log_enabled`.
    pub fn new(config: ProxyConfig) -> Result<Self, SetupError> {
        let logger: Arc<dyn RequestLogger> = if config.observability.log_enabled {
            Arc::new(TracingLogger)
        } else {
            Arc::new(NoopLogger)
        };
        Self::with_logger(config, logger)
    }

    /// Create a new HTTP server with an explicit request logger.
    pub fn with_logger(
        config: ProxyConfig,
        logger: Arc<dyn RequestLogger>,
    ) -> Result<Self, SetupError> {
        let forwarder = Arc::new(Forwarder::from_config(&config, logger)?);
        let router = Self::build_router(AppState { forwarder });
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let prefix = state.forwarder.prefix().to_string();

        Router::new()
            .route(&prefix, any(forward_handler))
            .route(&format!("{prefix}{{*suffix}}"), any(forward_handler))
            .fallback(not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            prefix = %self.config.forwarding.path_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The fully layered router, for serving in-process.
    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.forwarder.forward(request).await
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "No matching route found")
}
