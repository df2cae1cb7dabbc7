//! HTTP service exposing the environment record.
//!
//! The running frontend fetches `/environment.json` at startup instead of
//! baking the values in at build time. The record is shared read-only
//! between handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, header},
    routing::get,
};

use crate::environment::Environment;
use crate::render::render_typescript;

pub const TYPESCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

#[derive(Clone)]
struct AppState {
    /// The loaded record. Never mutated after startup.
    environment: Arc<Environment>,
}

/// Build the router serving `environment`.
pub fn router(environment: Arc<Environment>) -> Router {
    Router::new()
        .route("/environment.json", get(environment_json))
        .route("/environment.ts", get(environment_ts))
        .route("/health", get(health))
        .with_state(AppState { environment })
}

/// Serve `environment` on `127.0.0.1:<port>` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if binding or serving fails.
pub async fn serve(environment: Environment, port: u16) -> std::io::Result<()> {
    let app = router(Arc::new(environment));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("shutting down");
}

async fn environment_json(State(state): State<AppState>) -> Json<Environment> {
    tracing::debug!("serving environment.json");
    Json(state.environment.as_ref().clone())
}

async fn environment_ts(
    State(state): State<AppState>,
) -> ([(HeaderName, &'static str); 1], String) {
    tracing::debug!("serving environment.ts");
    (
        [(header::CONTENT_TYPE, TYPESCRIPT_CONTENT_TYPE)],
        render_typescript(&state.environment),
    )
}

async fn health() -> &'static str {
    "ok"
}
