//! OCR Settings database operations

use sqlx::SqlitePool;

use crate::ocr::OcrSettings;

/// OCR Settings repository (single row)
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> sqlx::Result<OcrSettings> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT pdf_resolution FROM ocr_settings WHERE id = 1")
                .fetch_optional(self.pool)
                .await?;

        Ok(match row {
            Some((pdf_resolution,)) => OcrSettings {
                pdf_resolution: u32::try_from(pdf_resolution).unwrap_or_default(),
            },
            None => OcrSettings::default(),
        })
    }

    pub async fn update(&self, settings: &OcrSettings) -> sqlx::Result<OcrSettings> {
        sqlx::query(
            r#"
            INSERT INTO ocr_settings (id, pdf_resolution, updated_at)
            VALUES (1, ?, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                pdf_resolution = excluded.pdf_resolution,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(i64::from(settings.pdf_resolution))
        .execute(self.pool)
        .await?;

        self.get().await
    }

    /// Set the resolution only if the settings were never saved
    pub async fn seed_resolution(&self, pdf_resolution: u32) -> sqlx::Result<()> {
        sqlx::query(
            "UPDATE ocr_settings SET pdf_resolution = ? WHERE id = 1 AND updated_at IS NULL",
        )
        .bind(i64::from(pdf_resolution))
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
