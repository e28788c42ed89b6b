//! Error types for the OCR server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ocr::OcrError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Ocr(e) if e.is_user_facing() => {
                let (status, error_type) = match e {
                    OcrError::MissingTarget => (StatusCode::NOT_FOUND, "not_found"),
                    OcrError::LanguageUnavailable(_) => {
                        (StatusCode::BAD_REQUEST, "language_unavailable")
                    }
                    _ => (StatusCode::BAD_REQUEST, "dictionary_unavailable"),
                };
                (status, error_type, e.to_string())
            }
            AppError::Ocr(e) => {
                tracing::error!("OCR error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ocr_error",
                    "OCR read failed".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
