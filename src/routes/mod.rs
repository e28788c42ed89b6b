//! Route modules for the OCR server

pub mod health;
pub mod jobs;
pub mod ocr;
pub mod ocr_reads;
pub mod realtime;
pub mod user;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .nest("/api/v1/ocr-reads", ocr_reads::router())
        .nest("/api/v1/ocr", ocr::router())
        .nest("/api/v1/jobs", jobs::router())
        .nest("/api/v1/realtime", realtime::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
