//! Axum HTTP facade — exposes the agent and its conversation memory.
//!
//! ## URL layout
//!
//! ```text
//! GET  /         — service info, endpoint map, tool description
//! POST /chat     — {"message": "..."} → QueryResult
//! GET  /memory   — current window, count and rendered context
//! POST /clear    — empty the window
//! GET  /health
//! ```
//!
//! `run()` drives the axum event loop until the [`CancellationToken`] fires.

mod api;

use std::sync::Arc;

use axum::{Router, routing::{get, post}};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::agent::Agent;
use crate::error::AppError;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone — all fields are reference-counted.
#[derive(Clone)]
pub struct HttpState {
    /// Reported by `/` and `/health`.
    pub service_name: Arc<str>,
    pub agent: Agent,
}

impl HttpState {
    pub fn new(service_name: impl Into<Arc<str>>, agent: Agent) -> Self {
        Self { service_name: service_name.into(), agent }
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind `bind_addr` and serve until `shutdown` is cancelled.
pub async fn run(
    bind_addr: String,
    state: HttpState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Http(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Http(format!("server error: {e}")))?;

    info!("http server shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/",       get(api::root))
        .route("/chat",   post(api::chat))
        .route("/memory", get(api::memory))
        .route("/clear",  post(api::clear))
        .route("/health", get(api::health))
        .with_state(state)
}
