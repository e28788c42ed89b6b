//! OCR API routes
//!
//! Standalone extraction plus the OCR Settings and OCR Language admin endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::ocr_reads::ReadResponse;
use super::user::CurrentUser;
use crate::db::{LanguageRepository, SettingsRepository, UpsertLanguage};
use crate::error::{AppError, Result};
use crate::ocr::{OcrLanguage, OcrSettings, ReadRequest, DEFAULT_LANGUAGE, DEFAULT_PROGRESS_EVENT};
use crate::state::AppState;

/// Create the OCR router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/read-document", post(read_document))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/languages", get(list_languages))
        .route("/languages/:code", put(upsert_language))
}

/// Standalone extraction request
#[derive(Debug, Deserialize)]
pub struct ReadDocumentRequest {
    pub path: Option<String>,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub spellcheck: bool,
    #[serde(default = "default_event")]
    pub event: String,
}

fn default_lang() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_event() -> String {
    DEFAULT_PROGRESS_EVENT.to_string()
}

/// Extract text from a raw path without touching any record
async fn read_document(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<ReadDocumentRequest>,
) -> Result<Json<ReadResponse>> {
    let request = ReadRequest::new(body.path, user)
        .language(body.lang)
        .spellcheck(body.spellcheck)
        .event(body.event);

    let text = state.ocr().read_document(&request).await?;
    Ok(Json(ReadResponse { text }))
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<OcrSettings>> {
    Ok(Json(SettingsRepository::new(state.db()).get().await?))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<OcrSettings>,
) -> Result<Json<OcrSettings>> {
    if settings.pdf_resolution == 0 {
        return Err(AppError::BadRequest(
            "pdf_resolution must be greater than zero".to_string(),
        ));
    }
    Ok(Json(SettingsRepository::new(state.db()).update(&settings).await?))
}

async fn list_languages(State(state): State<AppState>) -> Result<Json<Vec<OcrLanguage>>> {
    Ok(Json(LanguageRepository::new(state.db()).list().await?))
}

async fn upsert_language(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(data): Json<UpsertLanguage>,
) -> Result<Json<OcrLanguage>> {
    let repo = LanguageRepository::new(state.db());
    Ok(Json(repo.upsert(&code, &data).await?))
}
