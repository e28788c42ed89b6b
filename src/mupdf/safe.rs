//! Thread-safe document wrapper for MuPDF
//!
//! MuPDF documents are not thread-safe. This wrapper keeps only the raw PDF
//! bytes, opens a fresh `mupdf::Document` for every operation and serializes
//! those operations behind a `parking_lot::Mutex`. No MuPDF handle outlives the
//! closure it was opened for.

use std::sync::Arc;

use mupdf::Document;
use parking_lot::Mutex;

use crate::ocr::OcrError;

const PDF_MIME: &str = "application/pdf";

/// Thread-safe PDF handle
pub struct SafeDocument {
    /// Raw PDF bytes
    data: Arc<Vec<u8>>,
    /// Cached page count
    page_count: usize,
    /// Serializes access to MuPDF
    lock: Mutex<()>,
}

impl SafeDocument {
    /// Open a PDF from bytes, validating it and caching its page count
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, OcrError> {
        let doc = Document::from_bytes(&data, PDF_MIME)?;
        let page_count = doc.page_count()?.max(0) as usize;

        Ok(Self {
            data: Arc::new(data),
            page_count,
            lock: Mutex::new(()),
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Execute a closure against a freshly opened document
    ///
    /// ```ignore
    /// let bounds = safe_doc.with_doc(|doc| {
    ///     let page = doc.load_page(0)?;
    ///     Ok(page.bounds()?)
    /// })?;
    /// ```
    pub fn with_doc<F, R>(&self, f: F) -> Result<R, OcrError>
    where
        F: FnOnce(&Document) -> Result<R, OcrError>,
    {
        let _guard = self.lock.lock();
        let doc = Document::from_bytes(&self.data, PDF_MIME)?;
        f(&doc)
    }
}

impl From<mupdf::Error> for OcrError {
    fn from(err: mupdf::Error) -> Self {
        OcrError::Rasterize(err.to_string())
    }
}
