//! OCR Types
//!
//! Settings, language mapping, read requests and the pipeline error type.

use serde::{Deserialize, Serialize};

/// Default rasterization resolution for PDF pages (DPI)
pub const DEFAULT_PDF_RESOLUTION: u32 = 300;

/// Language used when a record does not name one
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Realtime event name progress is published under by default
pub const DEFAULT_PROGRESS_EVENT: &str = "ocr_progress_bar";

/// Process-wide OCR settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Resolution PDF pages are rasterized at before recognition
    pub pdf_resolution: u32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            pdf_resolution: DEFAULT_PDF_RESOLUTION,
        }
    }
}

/// Mapping from an internal language code to engine and dictionary codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OcrLanguage {
    /// Internal code, as stored on OCR Read records
    pub code: String,
    /// Tesseract traineddata name
    pub engine_code: String,
    /// Spell-checker dictionary code, if one exists for this language
    pub dictionary_code: Option<String>,
    /// Whether the engine can currently recognize this language
    pub supported: bool,
}

impl OcrLanguage {
    pub fn new(code: &str, dictionary_code: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            engine_code: code.to_string(),
            dictionary_code: dictionary_code.map(str::to_string),
            supported: true,
        }
    }
}

/// A single extraction request against a raw path
#[derive(Debug, Clone)]
pub struct ReadRequest {
    /// Stored-file reference (see [`super::FileRef`])
    pub path: Option<String>,
    /// Internal language code
    pub language: String,
    /// Run spell correction over the recognized text
    pub spellcheck: bool,
    /// Realtime event progress is published under
    pub event: String,
    /// User the progress channel is scoped to
    pub user: String,
}

impl ReadRequest {
    pub fn new(path: Option<String>, user: impl Into<String>) -> Self {
        Self {
            path,
            language: DEFAULT_LANGUAGE.to_string(),
            spellcheck: false,
            event: DEFAULT_PROGRESS_EVENT.to_string(),
            user: user.into(),
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn spellcheck(mut self, spellcheck: bool) -> Self {
        self.spellcheck = spellcheck;
        self
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR read requires an OCR Read record")]
    MissingTarget,

    #[error("The selected language is not available. Please contact your administrator.")]
    LanguageUnavailable(String),

    #[error("No spell-check dictionary available for language: {0}")]
    DictionaryUnavailable(String),

    #[error("Failed to fetch remote file: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to rasterize PDF: {0}")]
    Rasterize(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl OcrError {
    /// Errors shown to the caller as a blocking message rather than a crash report
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::MissingTarget | Self::LanguageUnavailable(_) | Self::DictionaryUnavailable(_)
        )
    }
}
