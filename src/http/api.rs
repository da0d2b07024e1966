//! Axum handlers.
//!
//! Each handler receives [`HttpState`] via [`axum::extract::State`]. Errors
//! are returned as `{"detail": "..."}` with the matching status code.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::knowledge::KnowledgeStore;

use super::HttpState;

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ChatRequest {
    message: String,
}

// ── Errors ────────────────────────────────────────────────────────────────────

pub(super) enum ApiError {
    /// Caller sent something unusable. Nothing was processed.
    BadRequest(String),
    /// Processing failed after validation.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(d) => (StatusCode::BAD_REQUEST, d),
            ApiError::Internal(d) => (StatusCode::INTERNAL_SERVER_ERROR, d),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /
pub(super) async fn root(State(state): State<HttpState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("Welcome to {} API", state.service_name),
        "service": &*state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/chat": "POST - Send a message to the AI agent",
            "/memory": "GET - View conversation history",
            "/clear": "POST - Clear conversation memory",
            "/health": "GET - Service health check",
        },
        "tools": [KnowledgeStore::describe()],
    }))
}

/// POST /chat
pub(super) async fn chat(
    State(state): State<HttpState>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    if req.message.trim().is_empty() {
        debug!("rejected empty chat message");
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }

    match state.agent.process(&req.message).await {
        Ok(result) => Ok((StatusCode::OK, Json(result)).into_response()),
        Err(e) => {
            warn!("chat processing failed: {e}");
            Err(ApiError::Internal(format!("Error processing request: {e}")))
        }
    }
}

/// GET /memory
pub(super) async fn memory(State(state): State<HttpState>) -> Result<Response, ApiError> {
    let snapshot = state.agent.memory().snapshot().map_err(|e| {
        warn!("memory read failed: {e}");
        ApiError::Internal(format!("Error reading memory: {e}"))
    })?;
    Ok(Json(snapshot).into_response())
}

/// POST /clear
pub(super) async fn clear(State(state): State<HttpState>) -> Result<Response, ApiError> {
    let memory = state.agent.memory();
    let count = memory
        .clear()
        .and_then(|()| memory.count())
        .map_err(|e| {
            warn!("memory clear failed: {e}");
            ApiError::Internal(format!("Error clearing memory: {e}"))
        })?;
    info!("conversation memory cleared");
    Ok(Json(json!({
        "message": "Conversation memory cleared successfully",
        "message_count": count,
    }))
    .into_response())
}

/// GET /health
pub(super) async fn health(State(state): State<HttpState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": &*state.service_name }))
}
