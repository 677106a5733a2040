//! HTTP surface: the SSE relay endpoint, the health probe, and the history
//! routes.

pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::relay::StreamRelay;
use crate::storage::HistoryDatabase;
use crate::upstream::OllamaClient;

/// The relay as wired in production.
pub type Relay = StreamRelay<OllamaClient, HistoryDatabase>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/stream", post(routes::stream))
        .route("/health", get(routes::health))
        .route(
            "/history",
            get(routes::list_history).delete(routes::clear_history),
        )
        .route("/history/{id}", delete(routes::delete_history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
