//! Page extraction
//!
//! PDFs are rasterized page by page through a [`PageRasterizer`]; plain images
//! are decoded directly. Either way the OCR engine receives a [`DynamicImage`].

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use super::types::OcrError;

/// Opens PDF documents for page-by-page rasterization
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn open(&self, data: Vec<u8>) -> Result<Arc<dyn RasterDocument>, OcrError>;
}

/// An opened PDF that can render its pages
#[async_trait]
pub trait RasterDocument: Send + Sync {
    fn page_count(&self) -> usize;

    /// Render page `index` (0-based) at `resolution` DPI, encoded as PNG
    async fn render_page(&self, index: usize, resolution: u32) -> Result<Vec<u8>, OcrError>;
}

/// Decode an image file into the form the OCR engine consumes
pub fn load_image(data: &[u8]) -> Result<DynamicImage, OcrError> {
    Ok(image::load_from_memory(data)?)
}

/// Encode an image as PNG
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let mut output = Vec::new();
    image.write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)?;
    Ok(output)
}
