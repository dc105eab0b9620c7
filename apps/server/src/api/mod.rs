use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use spendwise_core::expenses::StorageBackend;
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

pub mod expenses;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: StorageBackend,
}

/// Reports which backend requests are currently routed to. The first call
/// triggers the remote availability probe.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.expense_service.active_backend().await,
    })
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", expenses::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
