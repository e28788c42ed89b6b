//! Test doubles for the OCR pipeline's collaborators

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use parking_lot::Mutex;

use crate::ocr::{
    encode_png, DictionaryProvider, OcrEngine, OcrError, PageRasterizer, RasterDocument,
    SpellDictionary,
};
use crate::realtime::{Progress, ProgressSink};

/// Dictionary backed by a known-word set and a fixed correction table
pub struct MapDictionary {
    known: HashSet<String>,
    corrections: HashMap<String, String>,
}

impl MapDictionary {
    pub fn new(known: &[&str], corrections: &[(&str, &str)]) -> Self {
        Self {
            known: known.iter().map(|w| w.to_string()).collect(),
            corrections: corrections
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl SpellDictionary for MapDictionary {
    fn unknown(&self, words: &[String]) -> BTreeSet<String> {
        words
            .iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !self.known.contains(w))
            .collect()
    }

    fn correction(&self, word: &str) -> Option<String> {
        self.corrections.get(word).cloned()
    }
}

/// Provider handing out [`MapDictionary`] instances by code
#[derive(Default)]
pub struct MapDictionaries {
    dictionaries: HashMap<String, Arc<dyn SpellDictionary>>,
}

impl MapDictionaries {
    pub fn with(mut self, code: &str, dictionary: MapDictionary) -> Self {
        self.dictionaries.insert(code.to_string(), Arc::new(dictionary));
        self
    }
}

impl DictionaryProvider for MapDictionaries {
    fn dictionary(&self, code: &str) -> Result<Arc<dyn SpellDictionary>, OcrError> {
        self.dictionaries
            .get(code)
            .cloned()
            .ok_or_else(|| OcrError::DictionaryUnavailable(code.to_string()))
    }
}

/// Engine returning canned text per call, recording what it was given
#[derive(Default)]
pub struct MockEngine {
    outputs: Mutex<Vec<String>>,
    delay: Option<Duration>,
    /// `(image width, language)` per recognize call, in call order
    pub calls: Mutex<Vec<(u32, String)>>,
}

impl MockEngine {
    /// Outputs are handed out in order; the last one repeats
    pub fn new(outputs: &[&str]) -> Self {
        Self {
            outputs: Mutex::new(outputs.iter().rev().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl OcrEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn installed_languages(&self) -> Result<Vec<String>, OcrError> {
        Ok(vec!["eng".to_string()])
    }

    async fn recognize(&self, image: &DynamicImage, language: &str) -> Result<String, OcrError> {
        self.calls.lock().push((image.width(), language.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut outputs = self.outputs.lock();
        let text = if outputs.len() > 1 {
            outputs.pop()
        } else {
            outputs.last().cloned()
        };
        Ok(text.unwrap_or_default())
    }
}

/// Rasterizer producing `pages` blank pages; page `i` is `i + 1` pixels wide
pub struct MockRasterizer {
    pub pages: usize,
    /// Page indexes rendered, in order
    pub rendered: Arc<Mutex<Vec<usize>>>,
}

impl MockRasterizer {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            rendered: Arc::default(),
        }
    }
}

#[async_trait]
impl PageRasterizer for MockRasterizer {
    async fn open(&self, _data: Vec<u8>) -> Result<Arc<dyn RasterDocument>, OcrError> {
        Ok(Arc::new(MockDocument {
            pages: self.pages,
            rendered: self.rendered.clone(),
        }))
    }
}

struct MockDocument {
    pages: usize,
    rendered: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl RasterDocument for MockDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    async fn render_page(&self, index: usize, _resolution: u32) -> Result<Vec<u8>, OcrError> {
        self.rendered.lock().push(index);
        encode_png(&DynamicImage::ImageRgb8(RgbImage::new(index as u32 + 1, 1)))
    }
}

/// Progress sink that keeps every event
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(String, String, Progress)>>,
}

impl RecordingSink {
    pub fn progress(&self) -> Vec<Progress> {
        self.events.lock().iter().map(|(_, _, p)| *p).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn publish(&self, event: &str, user: &str, progress: Progress) {
        self.events
            .lock()
            .push((event.to_string(), user.to_string(), progress));
    }
}

/// A tiny valid PNG
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&DynamicImage::ImageRgb8(RgbImage::new(width, height))).unwrap()
}
