//! OCR Server
//!
//! Extracts text from stored images and PDFs, with progress streamed to the
//! UI and results stored on OCR Read records.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_server::config::Config;
use ocr_server::db::{self, LanguageRepository, SettingsRepository};
use ocr_server::jobs::JobQueue;
use ocr_server::mupdf::MupdfRasterizer;
use ocr_server::ocr::{
    DictionaryStore, DocumentReader, FileLoader, OcrEngine, OcrReadService, SitePaths,
    TesseractEngine,
};
use ocr_server::realtime::RealtimeHub;
use ocr_server::routes;
use ocr_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ocr_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting OCR Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Site path: {}", config.ocr.site_path.display());

    // Initialize database
    let db_pool = db::create_pool(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database initialized at {}", config.database.url);

    LanguageRepository::new(&db_pool)
        .seed(&config.ocr.default_languages)
        .await
        .context("Failed to seed OCR languages")?;
    SettingsRepository::new(&db_pool)
        .seed_resolution(config.ocr.default_pdf_resolution)
        .await
        .context("Failed to seed OCR settings")?;

    // OCR engine
    let engine = Arc::new(TesseractEngine::new(&config.ocr.tesseract_cmd));
    sync_languages(engine.as_ref(), &db_pool).await;

    // Document reader
    let realtime = Arc::new(RealtimeHub::default());
    let loader = FileLoader::new(
        SitePaths {
            site_path: config.ocr.site_path.clone(),
            assets_root: config.ocr.assets_root.clone(),
        },
        Duration::from_secs(config.ocr.fetch_timeout_secs),
    )
    .context("Failed to build HTTP client")?;
    let reader = DocumentReader::new(
        loader,
        Arc::new(MupdfRasterizer::new()),
        engine,
        Arc::new(DictionaryStore::new(config.ocr.dictionary_dir.clone())),
        realtime.clone(),
    );
    let service = OcrReadService::new(db_pool.clone(), Arc::new(reader), Arc::new(JobQueue::new()));

    // Create application state
    let app_state = AppState::new(db_pool, service, realtime);
    let app = routes::app(app_state);

    // Start server with graceful shutdown
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid SERVER_HOST: {}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("OCR Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Update each language's `supported` flag from the engine's installed data
async fn sync_languages(engine: &dyn OcrEngine, db_pool: &sqlx::SqlitePool) {
    if !engine.is_available().await {
        tracing::warn!("OCR engine '{}' not found; keeping stored language flags", engine.name());
        return;
    }

    match engine.installed_languages().await {
        Ok(installed) => {
            tracing::info!("OCR engine languages: {}", installed.join(", "));
            match LanguageRepository::new(db_pool).sync_supported(&installed).await {
                Ok(changed) => tracing::info!("Updated availability of {} OCR languages", changed),
                Err(e) => tracing::warn!("Failed to update OCR languages: {}", e),
            }
        }
        Err(e) => tracing::warn!("Failed to list OCR engine languages: {}", e),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
