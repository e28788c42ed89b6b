//! MuPDF page rasterizer
//!
//! Renders PDF pages to PNG at a requested resolution. All MuPDF work runs on
//! the blocking thread pool.

use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Matrix};
use tracing::debug;

use super::SafeDocument;
use crate::ocr::{encode_png, OcrError, PageRasterizer, RasterDocument};

/// PDF user space resolution
const POINTS_PER_INCH: f32 = 72.0;

/// [`PageRasterizer`] backed by MuPDF
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfRasterizer;

impl MupdfRasterizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PageRasterizer for MupdfRasterizer {
    async fn open(&self, data: Vec<u8>) -> Result<Arc<dyn RasterDocument>, OcrError> {
        let doc = tokio::task::spawn_blocking(move || SafeDocument::from_bytes(data))
            .await
            .map_err(|e| OcrError::Rasterize(format!("Task join error: {}", e)))??;

        debug!(pages = doc.page_count(), "Opened PDF for rasterization");
        Ok(Arc::new(MupdfDocument { doc: Arc::new(doc) }))
    }
}

struct MupdfDocument {
    doc: Arc<SafeDocument>,
}

#[async_trait]
impl RasterDocument for MupdfDocument {
    fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    async fn render_page(&self, index: usize, resolution: u32) -> Result<Vec<u8>, OcrError> {
        if index >= self.doc.page_count() {
            return Err(OcrError::Rasterize(format!("Page not found: index {}", index)));
        }

        let doc = self.doc.clone();
        let scale = resolution.max(1) as f32 / POINTS_PER_INCH;

        tokio::task::spawn_blocking(move || {
            doc.with_doc(|mupdf_doc| {
                let page = mupdf_doc.load_page(index as i32)?;
                let matrix = Matrix::new_scale(scale, scale);
                let colorspace = Colorspace::device_rgb();
                let pixmap = page.to_pixmap(&matrix, &colorspace, false, true)?;
                encode_pixmap(&pixmap)
            })
        })
        .await
        .map_err(|e| OcrError::Rasterize(format!("Task join error: {}", e)))?
    }
}

/// Copy a MuPDF pixmap into an RGB image and encode it as PNG
fn encode_pixmap(pixmap: &mupdf::Pixmap) -> Result<Vec<u8>, OcrError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = (pixmap.n() as usize).max(1);

    let mut rgb_buffer = Vec::with_capacity((width * height * 3) as usize);
    for pixel in 0..(width as usize * height as usize) {
        let offset = pixel * n;
        let r = samples.get(offset).copied().unwrap_or(0);
        // Grayscale pixmaps carry one channel
        let (g, b) = if n >= 3 {
            (
                samples.get(offset + 1).copied().unwrap_or(0),
                samples.get(offset + 2).copied().unwrap_or(0),
            )
        } else {
            (r, r)
        };
        rgb_buffer.extend_from_slice(&[r, g, b]);
    }

    let img = RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| OcrError::Rasterize("Failed to create image buffer".to_string()))?;

    encode_png(&DynamicImage::ImageRgb8(img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::load_image;

    /// Minimal valid single-page PDF (US Letter, empty content)
    fn minimal_pdf() -> Vec<u8> {
        b"%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj
2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj
3 0 obj
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << >> >>
endobj
4 0 obj
<< /Length 0 >>
stream
endstream
endobj
xref
0 5
0000000000 65535 f
0000000009 00000 n
0000000058 00000 n
0000000115 00000 n
0000000226 00000 n
trailer
<< /Size 5 /Root 1 0 R >>
startxref
276
%%EOF"
            .to_vec()
    }

    #[tokio::test]
    async fn test_render_page_at_resolution() {
        let doc = MupdfRasterizer::new().open(minimal_pdf()).await.unwrap();
        assert_eq!(doc.page_count(), 1);

        let png = doc.render_page(0, 36).await.unwrap();
        let image = load_image(&png).unwrap();
        // 612x792 points at half of 72 DPI
        assert_eq!((image.width(), image.height()), (306, 396));
    }

    #[tokio::test]
    async fn test_render_missing_page_fails() {
        let doc = MupdfRasterizer::new().open(minimal_pdf()).await.unwrap();
        assert!(matches!(
            doc.render_page(3, 72).await,
            Err(OcrError::Rasterize(_))
        ));
    }
}
