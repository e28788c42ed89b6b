//! OCR Read database operations

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

/// OCR Read record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OcrRead {
    pub id: String,
    pub file_to_read: Option<String>,
    pub language: Option<String>,
    pub spell_checker: bool,
    pub read_result: Option<String>,
    pub read_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create OCR Read request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOcrRead {
    pub file_to_read: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub spell_checker: bool,
}

/// Update OCR Read request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOcrRead {
    pub file_to_read: Option<String>,
    pub language: Option<String>,
    pub spell_checker: Option<bool>,
}

/// OCR Read repository
pub struct OcrReadRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OcrReadRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific record
    pub async fn get(&self, id: &str) -> sqlx::Result<Option<OcrRead>> {
        sqlx::query_as::<_, OcrRead>(
            r#"
            SELECT id, file_to_read, language, spell_checker, read_result, read_time,
                   created_at, updated_at
            FROM ocr_reads
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    /// List records, newest first
    pub async fn list(&self) -> sqlx::Result<Vec<OcrRead>> {
        sqlx::query_as::<_, OcrRead>(
            r#"
            SELECT id, file_to_read, language, spell_checker, read_result, read_time,
                   created_at, updated_at
            FROM ocr_reads
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await
    }

    /// Create a new record
    pub async fn create(&self, data: &CreateOcrRead) -> sqlx::Result<OcrRead> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO ocr_reads (id, file_to_read, language, spell_checker, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.file_to_read)
        .bind(&data.language)
        .bind(data.spell_checker)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        self.get(&id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Update the request fields of a record. Results are only written by [`Self::save_result`].
    pub async fn update(&self, id: &str, data: &UpdateOcrRead) -> sqlx::Result<Option<OcrRead>> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE ocr_reads SET
                file_to_read = COALESCE(?, file_to_read),
                language = COALESCE(?, language),
                spell_checker = COALESCE(?, spell_checker),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&data.file_to_read)
        .bind(&data.language)
        .bind(data.spell_checker)
        .bind(&now)
        .bind(id)
        .execute(self.pool)
        .await?;

        self.get(id).await
    }

    /// Store the outcome of a read
    pub async fn save_result(
        &self,
        id: &str,
        read_result: Option<&str>,
        read_time: &str,
    ) -> sqlx::Result<Option<OcrRead>> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE ocr_reads SET read_result = ?, read_time = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(read_result)
        .bind(read_time)
        .bind(&now)
        .bind(id)
        .execute(self.pool)
        .await?;

        self.get(id).await
    }

    /// Delete a record
    pub async fn delete(&self, id: &str) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM ocr_reads WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
