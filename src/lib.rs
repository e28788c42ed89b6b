//! OCR Server Library
//!
//! Extracts text from stored images and PDFs with Tesseract, optionally
//! spell-corrects it, and stores the result on OCR Read records.
//! The server binary is in main.rs.
//!
//! # Modules
//!
//! - `ocr`: Path resolution, page extraction, recognition and spell correction
//! - `mupdf`: PDF page rasterization via MuPDF
//! - `db`: SQLite persistence for records, languages and settings
//! - `jobs`: Background job runner
//! - `realtime`: Progress notifications
//! - `routes`: HTTP API

pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod mupdf;
pub mod ocr;
pub mod realtime;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;
