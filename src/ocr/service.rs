//! OCR Read service
//!
//! Runs the reader against stored OCR Read records and persists the outcome.

use std::sync::Arc;
use std::time::Instant;

use sqlx::SqlitePool;
use tracing::{info, instrument};

use super::reader::DocumentReader;
use super::types::{OcrError, ReadRequest, DEFAULT_LANGUAGE};
use crate::db::{LanguageRepository, OcrReadRepository, SettingsRepository};
use crate::jobs::{EnqueueOptions, JobInfo, TaskSubmitter};

/// Invocation wrapper around [`DocumentReader`] for OCR Read records
#[derive(Clone)]
pub struct OcrReadService {
    db: SqlitePool,
    reader: Arc<DocumentReader>,
    jobs: Arc<dyn TaskSubmitter>,
}

impl OcrReadService {
    pub fn new(db: SqlitePool, reader: Arc<DocumentReader>, jobs: Arc<dyn TaskSubmitter>) -> Self {
        Self { db, reader, jobs }
    }

    pub fn reader(&self) -> &Arc<DocumentReader> {
        &self.reader
    }

    pub fn jobs(&self) -> &Arc<dyn TaskSubmitter> {
        &self.jobs
    }

    /// Read a raw path with the current settings and language catalog
    pub async fn read_document(&self, request: &ReadRequest) -> Result<Option<String>, OcrError> {
        let settings = SettingsRepository::new(&self.db).get().await?;
        let languages = LanguageRepository::new(&self.db).catalog().await?;
        self.reader.read(request, &settings, &languages).await
    }

    /// Read the record's file now and store the text and elapsed seconds on it.
    ///
    /// Nothing is written when the read fails.
    #[instrument(skip(self))]
    pub async fn read_record(&self, id: &str, user: &str) -> Result<Option<String>, OcrError> {
        let repo = OcrReadRepository::new(&self.db);
        let record = repo.get(id).await?.ok_or(OcrError::MissingTarget)?;

        let request = ReadRequest::new(record.file_to_read.clone(), user)
            .language(record.language.as_deref().unwrap_or(DEFAULT_LANGUAGE))
            .spellcheck(record.spell_checker);

        let started = Instant::now();
        let text = self.read_document(&request).await?;
        let read_time = started.elapsed().as_secs_f64().to_string();

        repo.save_result(id, text.as_deref(), &read_time).await?;
        info!(record = %id, read_time = %read_time, "OCR Read saved");

        Ok(text)
    }

    /// Queue [`Self::read_record`] on the long queue and return the job right away
    pub async fn enqueue_record(
        &self,
        id: &str,
        user: &str,
        is_async: bool,
        now: bool,
    ) -> Result<JobInfo, OcrError> {
        let service = self.clone();
        let record_id = id.to_string();
        let user = user.to_string();

        let options = EnqueueOptions::long(format!("ocr_read:{}", id))
            .is_async(is_async)
            .now(now);

        self.jobs
            .submit(
                options,
                Box::pin(async move {
                    service.read_record(&record_id, &user).await.map(|_| ())
                }),
            )
            .await
    }
}
