//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::ocr::OcrReadService;
use crate::realtime::RealtimeHub;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: SqlitePool,
    ocr: OcrReadService,
    realtime: Arc<RealtimeHub>,
}

impl AppState {
    /// Create a new application state
    ///
    /// `realtime` must be the hub the reader inside `ocr` publishes to.
    pub fn new(db: SqlitePool, ocr: OcrReadService, realtime: Arc<RealtimeHub>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                ocr,
                realtime,
            }),
        }
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the OCR Read service
    pub fn ocr(&self) -> &OcrReadService {
        &self.inner.ocr
    }

    /// Get the realtime hub
    pub fn realtime(&self) -> &RealtimeHub {
        &self.inner.realtime
    }
}
