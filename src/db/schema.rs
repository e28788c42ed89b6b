//! Database schema initialization

use sqlx::SqlitePool;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- OCR Read records (one extraction target each)
CREATE TABLE IF NOT EXISTS ocr_reads (
    id TEXT PRIMARY KEY,
    -- Stored-file reference: /files/..., /private/files/..., /assets/..., absolute path or URL
    file_to_read TEXT,
    -- Internal language code (NULL reads as 'eng')
    language TEXT,
    spell_checker INTEGER NOT NULL DEFAULT 0,
    read_result TEXT,
    -- Elapsed seconds of the last read, as text
    read_time TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_ocr_reads_created_at ON ocr_reads(created_at);

-- OCR Language mapping
CREATE TABLE IF NOT EXISTS ocr_languages (
    code TEXT PRIMARY KEY,
    engine_code TEXT NOT NULL,
    dictionary_code TEXT,
    supported INTEGER NOT NULL DEFAULT 1
);

-- OCR Settings (single row)
CREATE TABLE IF NOT EXISTS ocr_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    pdf_resolution INTEGER NOT NULL DEFAULT 300,
    -- NULL until the settings are first saved
    updated_at TEXT
);

INSERT OR IGNORE INTO ocr_settings (id) VALUES (1);
"#;
