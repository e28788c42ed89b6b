//! Background job status routes

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::jobs::JobInfo;
use crate::state::AppState;

/// Create the jobs router
pub fn router() -> Router<AppState> {
    Router::new().route("/:id", get(get_job))
}

/// Get a job's current status
async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<JobInfo>> {
    state
        .ocr()
        .jobs()
        .status(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job not found: {}", id)))
}
