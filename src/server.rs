//! HTTP server assembly
//!
//! Thin axum layer over the transfer core and member directory. Routing and
//! encoding only; every rule lives in the orchestrator and stores.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::{Router, extract::State};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::db::Database;
use crate::transfer::TransferOrchestrator;

/// Shared application state
pub struct AppState {
    pub db: Arc<Database>,
    pub orchestrator: Arc<TransferOrchestrator>,
}

/// JSON error body returned by all handlers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// Build the full application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(crate::transfer::api::routes())
        .merge(crate::member::api::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("DATABASE_UNAVAILABLE", e)),
        )
            .into_response(),
    }
}
