//! OCR Engines
//!
//! Defines the engine trait and the Tesseract implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::process::Command;
use tracing::debug;

use super::pages::encode_png;
use super::types::OcrError;

/// OCR engine trait
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name, for logs and diagnostics
    fn name(&self) -> &'static str;

    /// Check if the engine can be invoked at all
    async fn is_available(&self) -> bool;

    /// Language codes the engine has recognition data for
    async fn installed_languages(&self) -> Result<Vec<String>, OcrError>;

    /// Recognize the text of a single page image, returned exactly as the engine produced it
    async fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError>;
}

/// Tesseract OCR engine, driven through the `tesseract` command line tool
pub struct TesseractEngine {
    /// Executable name or path
    command: String,
    /// Where page images are written for the engine to read
    temp_dir: PathBuf,
}

impl TesseractEngine {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            temp_dir: std::env::temp_dir(),
        }
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn installed_languages(&self) -> Result<Vec<String>, OcrError> {
        let output = Command::new(&self.command)
            .arg("--list-langs")
            .output()
            .await
            .map_err(|e| OcrError::Engine(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!("Tesseract failed: {}", stderr)));
        }

        Ok(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        // Removed on drop, including when this future is cancelled
        let input = tempfile::Builder::new()
            .prefix("ocr_input_")
            .suffix(".png")
            .tempfile_in(&self.temp_dir)?;
        tokio::fs::write(input.path(), encode_png(image)?).await?;

        debug!(
            width = image.width(),
            height = image.height(),
            language,
            "Running tesseract"
        );

        let result = Command::new(&self.command)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("3")
            .kill_on_drop(true)
            .output()
            .await;

        let output =
            result.map_err(|e| OcrError::Engine(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!("Tesseract failed: {}", stderr)));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| OcrError::Engine(format!("Tesseract produced invalid UTF-8: {}", e)))
    }
}

/// Parse `tesseract --list-langs` output, skipping the header line
pub fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip_while(|line| !line.starts_with("List of available languages"))
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
