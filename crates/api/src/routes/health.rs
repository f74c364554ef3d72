//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `"in-memory"` means carts will not survive a restart.
    pub cart_backend: &'static str,
}

/// GET /health: reports liveness and which cart backend is serving.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cart_backend: state.cart_backend.as_str(),
    })
}
