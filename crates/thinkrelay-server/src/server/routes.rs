use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::AppState;
use crate::relay::encoder;
use crate::storage::{DatabaseError, HistoryStore};
use crate::upstream::UpstreamError;

#[derive(Debug, Default, Deserialize)]
pub struct StreamRequest {
    #[serde(default)]
    pub prompt: String,
}

fn error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "message": message })),
    )
        .into_response()
}

fn success() -> Response {
    Json(json!({ "status": "success" })).into_response()
}

fn storage_error(e: &DatabaseError) -> Response {
    warn!(error = %e, "History request failed");
    error_response(&e.to_string())
}

/// `POST /stream` relays one prompt as a `text/event-stream`.
pub async fn stream(
    State(state): State<AppState>,
    Json(request): Json<StreamRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(prompt_chars = request.prompt.chars().count(), "Stream requested");
    let events = Arc::clone(&state.relay)
        .stream(request.prompt)
        .map(|event| Ok(encoder::frame(&event)));
    Sse::new(events)
}

/// `GET /health` probes the backend's version endpoint.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.relay.upstream().version().await {
        Ok(version) => Json(json!({ "status": "healthy", "ollama_version": version })).into_response(),
        Err(UpstreamError::Status(code)) => {
            warn!(code, "Health probe got non-success status");
            error_response("Ollama server returned non-200 status")
        }
        Err(e) => {
            warn!(error = %e, "Health probe failed");
            error_response("Could not connect to Ollama server")
        }
    }
}

/// `GET /history` lists exchanges, newest first.
pub async fn list_history(State(state): State<AppState>) -> Response {
    match state.relay.store().list().await {
        Ok(exchanges) => Json(exchanges).into_response(),
        Err(e) => storage_error(&e),
    }
}

/// `DELETE /history/{id}`; unknown ids succeed.
pub async fn delete_history(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.relay.store().delete(id).await {
        Ok(()) => success(),
        Err(e) => storage_error(&e),
    }
}

/// `DELETE /history`
pub async fn clear_history(State(state): State<AppState>) -> Response {
    match state.relay.store().clear().await {
        Ok(()) => {
            info!("History cleared");
            success()
        }
        Err(e) => storage_error(&e),
    }
}
