//! OCR Module
//!
//! Extracts text from stored images and PDFs with an external OCR engine.
//!
//! Pipeline: [`FileLoader`] resolves and loads the file, a [`PageRasterizer`]
//! turns PDF pages into images, the [`OcrEngine`] recognizes each page, and the
//! text is optionally spell-corrected before [`OcrReadService`] stores it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_server::ocr::{OcrReadService, ReadRequest};
//!
//! let request = ReadRequest::new(Some("/files/scan.pdf".into()), "Guest")
//!     .language("eng")
//!     .spellcheck(true);
//! let text = service.read_document(&request).await?;
//! ```

mod engine;
mod language;
mod pages;
mod reader;
mod service;
mod source;
mod spell;
mod types;

pub use engine::{parse_language_list, OcrEngine, TesseractEngine};
pub use language::LanguageCatalog;
pub use pages::{encode_png, load_image, PageRasterizer, RasterDocument};
pub use reader::DocumentReader;
pub use service::OcrReadService;
pub use source::{is_pdf, FileLoader, FileRef, SitePaths};
pub use spell::{
    correct_text, words_from_text, DictionaryProvider, DictionaryStore, SpellDictionary,
    SymSpellDictionary,
};
pub use types::{
    OcrError, OcrLanguage, OcrSettings, ReadRequest, DEFAULT_LANGUAGE, DEFAULT_PDF_RESOLUTION,
    DEFAULT_PROGRESS_EVENT,
};
