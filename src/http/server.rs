//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all edge routes
//! - Wire up middleware (tracing, timeout, request ID, panic catch-all)
//! - Bind the server to a listener and serve until shutdown
//!
//! # Design Decisions
//! - The boundary always answers with a JSON envelope; even a panicking
//!   handler is converted into a `fail(500, msg)` response

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::{CatchPanicLayer, ResponseForPanic},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::envelope::Envelope;
use crate::http::handlers;
use crate::relay::RelayClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayClient>,
}

/// HTTP server for the relay edge.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig, relay: RelayClient) -> Self {
        let state = AppState {
            relay: Arc::new(relay),
        };
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Build the Axum router with all edge routes and middleware layers.
///
/// Exposed separately so tests can drive the router in-process.
pub fn build_router(config: &RelayConfig, state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/user",
            post(handlers::create_user)
                .get(handlers::retrieve_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/v1/users", get(handlers::extract_users))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CatchPanicLayer::custom(EnvelopePanic))
}

/// Converts a handler panic into a failure envelope so the boundary
/// contract (always a JSON envelope) holds even for programming errors.
#[derive(Clone, Copy)]
struct EnvelopePanic;

impl ResponseForPanic for EnvelopePanic {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let msg = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "unhandled error".to_string()
        };
        tracing::error!(error = %msg, "handler panicked");
        let body = serde_json::to_vec(&Envelope::<()>::fail_default(msg)).unwrap_or_default();
        Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
