//! Health check route

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    engine: &'static str,
    engine_available: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.ocr().reader().engine();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        engine: engine.name(),
        engine_available: engine.is_available().await,
    })
}
