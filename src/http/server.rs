//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, rate limit, security headers, API logging)
//! - Bind server to listener
//! - SPA fallback for unmatched non-API GETs
//! - Background expiry sweep for the rate-limit table

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::schema::ServerConfig;
use crate::observability::metrics;
use crate::security::headers::security_headers_middleware;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::web::spa::spa_fallback;
use crate::ws;
use crate::ws::registry::ConnectionRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<ConnectionRegistry>,
    pub started_at: Instant,
}

/// The HTTP/WebSocket server.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let config = Arc::new(config);
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let registry = Arc::new(ConnectionRegistry::new());

        let state = AppState {
            config: config.clone(),
            registry,
            started_at: Instant::now(),
        };

        let router = Self::build_router(state, config.clone(), limiter.clone());
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layer order (outermost first): trace → security headers → rate limit
    /// → API logging → dispatch. Headers wrap the rate limiter so 429
    /// rejections carry them too.
    fn build_router(
        state: AppState,
        config: Arc<ServerConfig>,
        limiter: Arc<RateLimiter>,
    ) -> Router {
        Router::new()
            .route("/api/system/status", get(api::system::get_system_status))
            .route(
                "/api/chat/messages",
                get(api::chat::list_messages).post(api::chat::create_message),
            )
            .route("/api/health", get(api::health::health_check))
            .route("/api/docs-redirect", get(api::health::docs_redirect))
            .route("/api/upload", post(api::upload::upload_file))
            .route("/ws", get(ws::handler::websocket_handler))
            .fallback(spa_fallback)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(middleware::from_fn_with_state(
                        config,
                        security_headers_middleware,
                    ))
                    .layer(middleware::from_fn_with_state(
                        limiter,
                        rate_limit_middleware,
                    ))
                    .layer(middleware::from_fn(api_log_middleware)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = ?self.config.environment,
            "HTTP server starting"
        );

        // Periodic expiry sweep keeps the rate table bounded.
        let limiter = self.limiter.clone();
        let sweep_interval = Duration::from_secs(self.config.rate_limit.window_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.sweep();
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Request logging for API paths, plus request metrics for everything.
async fn api_log_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status().as_u16();

    metrics::record_request(method.as_str(), status, start);

    if path.starts_with("/api/") {
        tracing::info!(
            method = %method,
            path = %path,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "API request"
        );
    }

    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
