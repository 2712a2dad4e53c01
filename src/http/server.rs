//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing)
//! - Dispatch requests: local handlers, route table lookup, proxy engine
//! - Serve optional static assets for unmatched paths
//! - Graceful shutdown on Ctrl+C or an explicit trigger

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::{GatewayConfig, TimeoutConfig};
use crate::http::dashboard::dashboard_handler;
use crate::http::status::status_handler;
use crate::proxy::{self, HttpClient};
use crate::routing::RouteTable;
use crate::upstream::Registry;

/// Application state injected into handlers.
///
/// Everything here is read-only after startup; concurrent sessions share it
/// without locks.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub registry: Arc<Registry>,
    pub client: HttpClient,
    pub timeouts: TimeoutConfig,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server from validated configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let state = AppState {
            table: Arc::new(RouteTable::build()),
            registry: Arc::new(Registry::from_config(&config.upstreams)),
            client: proxy::build_client(&config.timeouts),
            timeouts: config.timeouts,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all handlers and middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", get(dashboard_handler))
            .route("/api/status", get(status_handler))
            .route("/api/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        // Unmatched paths fall through to static assets when a directory is
        // configured, otherwise to a plain 404.
        match &config.static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router.fallback(fallback_handler),
        }
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Shuts down gracefully on Ctrl+C or when `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main proxy handler: route table lookup, then forward or relay.
///
/// Each invocation is one ProxySession: it owns the client connection and
/// the upstream connection until both sides finish or one fails, and shares
/// no mutable state with other sessions.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(route) = state.table.match_route(&method, &path) else {
        tracing::debug!(method = %method, path = %path, "no route matched");
        return (StatusCode::NOT_FOUND, "no such route").into_response();
    };

    let target = state.registry.resolve(route.upstream);
    let streaming = route.streaming;

    let result = if streaming {
        proxy::relay(&state.client, target, route, request, state.timeouts).await
    } else {
        proxy::forward(&state.client, target, route, request, state.timeouts).await
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(route = %err.route(), error = %err, "upstream exchange failed");
            err.into_client_response(streaming)
        }
    }
}

/// Default handler when no static directory is configured.
async fn fallback_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

/// Wait for Ctrl+C or an explicit shutdown trigger.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if result.is_ok() {
                tracing::info!("Shutdown signal received");
            }
        }
        _ = shutdown.recv() => {
            tracing::info!("Shutdown triggered");
        }
    }
}
