//! server
//!
//! HTTP surface: `POST /upload` (bearer protected) and `GET /health`.

pub mod auth;
pub mod error;
pub mod upload;

use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::publish::Publisher;

pub use error::AppError;
pub use upload::{UploadFileResponse, UploadParams};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<Publisher>,
    pub incoming_secret: Arc<str>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("publisher", &self.publisher)
            .field("incoming_secret", &"[REDACTED]")
            .finish()
    }
}

impl AppState {
    pub fn new(publisher: Publisher, incoming_secret: &str) -> Self {
        Self {
            publisher: Arc::new(publisher),
            incoming_secret: Arc::from(incoming_secret),
        }
    }
}

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/upload", post(upload::upload))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "vocab-publisher" }))
}

/// Serve on `addr` until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    shutdown_on(tokio::signal::ctrl_c()).await
}

/// Resolve once `signal` fires. If the signal cannot be installed the
/// server keeps running.
async fn shutdown_on(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            error!(error = %e, "cannot listen for Ctrl-C, graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_resolves_shutdown() {
        shutdown_on(async { Ok(()) }).await;
    }

    #[tokio::test]
    async fn failed_signal_keeps_serving() {
        let failed = shutdown_on(async { Err(std::io::Error::other("no signal handler")) });
        tokio::select! {
            biased;
            _ = failed => panic!("shutdown resolved after signal setup failed"),
            _ = tokio::task::yield_now() => {}
        }
    }
}
