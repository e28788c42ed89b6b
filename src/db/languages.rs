//! OCR Language database operations

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::ocr::{LanguageCatalog, OcrLanguage};

/// Upsert OCR Language request
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLanguage {
    pub engine_code: Option<String>,
    pub dictionary_code: Option<String>,
    #[serde(default = "default_true")]
    pub supported: bool,
}

fn default_true() -> bool {
    true
}

/// OCR Language repository
pub struct LanguageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LanguageRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, code: &str) -> sqlx::Result<Option<OcrLanguage>> {
        sqlx::query_as::<_, OcrLanguage>(
            "SELECT code, engine_code, dictionary_code, supported FROM ocr_languages WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn list(&self) -> sqlx::Result<Vec<OcrLanguage>> {
        sqlx::query_as::<_, OcrLanguage>(
            "SELECT code, engine_code, dictionary_code, supported FROM ocr_languages ORDER BY code",
        )
        .fetch_all(self.pool)
        .await
    }

    /// Snapshot of every language, for handing to the reader
    pub async fn catalog(&self) -> sqlx::Result<LanguageCatalog> {
        Ok(LanguageCatalog::new(self.list().await?))
    }

    /// Insert languages that do not exist yet; existing rows are left untouched
    pub async fn seed(&self, languages: &[OcrLanguage]) -> sqlx::Result<()> {
        for lang in languages {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO ocr_languages (code, engine_code, dictionary_code, supported)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&lang.code)
            .bind(&lang.engine_code)
            .bind(&lang.dictionary_code)
            .bind(lang.supported)
            .execute(self.pool)
            .await?;
        }
        Ok(())
    }

    /// Create or replace a language mapping
    pub async fn upsert(&self, code: &str, data: &UpsertLanguage) -> sqlx::Result<OcrLanguage> {
        let engine_code = data.engine_code.as_deref().unwrap_or(code);

        sqlx::query(
            r#"
            INSERT INTO ocr_languages (code, engine_code, dictionary_code, supported)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(code) DO UPDATE SET
                engine_code = excluded.engine_code,
                dictionary_code = excluded.dictionary_code,
                supported = excluded.supported
            "#,
        )
        .bind(code)
        .bind(engine_code)
        .bind(&data.dictionary_code)
        .bind(data.supported)
        .execute(self.pool)
        .await?;

        self.get(code).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Mark each language supported iff the engine has data for its engine code.
    /// Returns the number of rows whose flag changed.
    pub async fn sync_supported(&self, installed: &[String]) -> sqlx::Result<u64> {
        let mut changed = 0;
        for lang in self.list().await? {
            let supported = installed.iter().any(|code| *code == lang.engine_code);
            if supported != lang.supported {
                sqlx::query("UPDATE ocr_languages SET supported = ? WHERE code = ?")
                    .bind(supported)
                    .bind(&lang.code)
                    .execute(self.pool)
                    .await?;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
