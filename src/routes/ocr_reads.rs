//! OCR Read API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::user::CurrentUser;
use crate::db::{CreateOcrRead, OcrRead, OcrReadRepository, UpdateOcrRead};
use crate::error::{AppError, Result};
use crate::jobs::JobInfo;
use crate::state::AppState;

/// Create the OCR Read router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reads).post(create_read))
        .route(
            "/:id",
            get(get_read).patch(update_read).delete(delete_read),
        )
        .route("/:id/read", post(read_now))
        .route("/:id/read-bg", post(read_in_background))
}

/// Extracted text
#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub text: Option<String>,
}

/// Background read options
#[derive(Debug, Deserialize)]
pub struct ReadBackgroundRequest {
    #[serde(default = "default_is_async")]
    pub is_async: bool,
    #[serde(default)]
    pub now: bool,
}

impl Default for ReadBackgroundRequest {
    fn default() -> Self {
        Self {
            is_async: true,
            now: false,
        }
    }
}

fn default_is_async() -> bool {
    true
}

/// List all OCR Reads
async fn list_reads(State(state): State<AppState>) -> Result<Json<Vec<OcrRead>>> {
    let repo = OcrReadRepository::new(state.db());
    Ok(Json(repo.list().await?))
}

/// Create a new OCR Read
async fn create_read(
    State(state): State<AppState>,
    Json(data): Json<CreateOcrRead>,
) -> Result<(StatusCode, Json<OcrRead>)> {
    let repo = OcrReadRepository::new(state.db());
    let read = repo.create(&data).await?;
    Ok((StatusCode::CREATED, Json(read)))
}

/// Get a specific OCR Read
async fn get_read(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<OcrRead>> {
    let repo = OcrReadRepository::new(state.db());
    repo.get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("OCR Read not found: {}", id)))
}

/// Update an OCR Read
async fn update_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateOcrRead>,
) -> Result<Json<OcrRead>> {
    let repo = OcrReadRepository::new(state.db());
    repo.update(&id, &data)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("OCR Read not found: {}", id)))
}

/// Delete an OCR Read
async fn delete_read(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let repo = OcrReadRepository::new(state.db());
    if repo.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("OCR Read not found: {}", id)))
    }
}

/// Read the record's file and store the result
async fn read_now(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ReadResponse>> {
    let text = state.ocr().read_record(&id, &user).await?;
    Ok(Json(ReadResponse { text }))
}

/// Queue a read of the record on the long queue
async fn read_in_background(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentUser(user): CurrentUser,
    body: Option<Json<ReadBackgroundRequest>>,
) -> Result<(StatusCode, Json<JobInfo>)> {
    let options = body.map(|Json(options)| options).unwrap_or_default();
    let job = state
        .ocr()
        .enqueue_record(&id, &user, options.is_async, options.now)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}
