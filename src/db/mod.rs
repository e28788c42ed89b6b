//! Database module for SQLite persistence
//!
//! Handles OCR Read records, the OCR Language mapping and OCR Settings.

mod languages;
mod ocr_reads;
mod schema;
mod settings;

pub use languages::*;
pub use ocr_reads::*;
pub use schema::*;
pub use settings::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Create a new database connection pool
pub async fn create_pool(database_url: &str) -> sqlx::Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    if !in_memory {
        options = options
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
    }

    // Every connection to an in-memory database is its own database
    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
    .connect_with(options)
    .await?;

    // Run migrations
    initialize_schema(&pool).await?;

    Ok(pool)
}
