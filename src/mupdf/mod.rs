//! Low-level MuPDF Wrapper
//!
//! PDF rasterization for the OCR pipeline. MuPDF's `fz_context` is not
//! thread-safe, so every operation opens a fresh document under a mutex
//! (see [`SafeDocument`]) and runs on the blocking thread pool.

mod raster;
mod safe;

pub use raster::MupdfRasterizer;
pub use safe::SafeDocument;
