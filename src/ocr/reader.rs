//! Document reader
//!
//! Runs one extraction: resolve the stored file, rasterize or decode it, run
//! every page through the OCR engine, optionally spell-correct, and report
//! progress along the way. Nothing here touches the database; settings and the
//! language catalog are passed in by the caller.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::engine::OcrEngine;
use super::language::LanguageCatalog;
use super::pages::{load_image, PageRasterizer};
use super::source::{is_pdf, FileLoader};
use super::spell::{correct_text, DictionaryProvider};
use super::types::{OcrError, OcrLanguage, OcrSettings, ReadRequest};
use crate::realtime::{Progress, ProgressSink};

/// Progress steps reported per PDF page: rasterize, load, extract
const STEPS_PER_PAGE: u32 = 3;

/// Percent scale used for single-image progress
const IMAGE_PROGRESS_TOTAL: u32 = 100;
const IMAGE_LOADED: u32 = 33;
const IMAGE_EXTRACTED: u32 = 66;

/// Extracts text from stored files
pub struct DocumentReader {
    loader: FileLoader,
    rasterizer: Arc<dyn PageRasterizer>,
    engine: Arc<dyn OcrEngine>,
    dictionaries: Arc<dyn DictionaryProvider>,
    progress: Arc<dyn ProgressSink>,
}

impl DocumentReader {
    pub fn new(
        loader: FileLoader,
        rasterizer: Arc<dyn PageRasterizer>,
        engine: Arc<dyn OcrEngine>,
        dictionaries: Arc<dyn DictionaryProvider>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            loader,
            rasterizer,
            engine,
            dictionaries,
            progress,
        }
    }

    pub fn engine(&self) -> &Arc<dyn OcrEngine> {
        &self.engine
    }

    /// Extract the text of `request.path`.
    ///
    /// Returns `Ok(None)` when no path is given. The language is checked before
    /// any file is touched; every later failure aborts the read.
    #[instrument(skip_all, fields(path = ?request.path, language = %request.language))]
    pub async fn read(
        &self,
        request: &ReadRequest,
        settings: &OcrSettings,
        languages: &LanguageCatalog,
    ) -> Result<Option<String>, OcrError> {
        let Some(path) = request.path.as_deref() else {
            return Ok(None);
        };

        let language = languages.ensure_available(&request.language)?;

        self.publish(request, Progress::Started);

        let file = self.loader.resolve(path);
        let data = self.loader.load(&file).await?;

        let (mut text, total) = if is_pdf(path) {
            self.read_pdf(data, language, settings, request).await?
        } else {
            self.read_image(&data, language, request).await?
        };

        if request.spellcheck {
            text = self.spellcheck(text, language).await?;
        }

        self.publish(request, Progress::step(total, total));
        info!(chars = text.len(), "OCR read complete");

        Ok(Some(text))
    }

    /// Rasterize and recognize every page in order. Returns the text and the progress total.
    async fn read_pdf(
        &self,
        data: Vec<u8>,
        language: &OcrLanguage,
        settings: &OcrSettings,
        request: &ReadRequest,
    ) -> Result<(String, u32), OcrError> {
        let doc = self.rasterizer.open(data).await?;
        let pages = doc.page_count();
        let total = pages as u32 * STEPS_PER_PAGE;
        debug!(pages, resolution = settings.pdf_resolution, "Reading PDF");

        let mut text = String::new();
        let mut completed = 0;
        for index in 0..pages {
            let png = doc.render_page(index, settings.pdf_resolution).await?;
            completed += 1;
            self.publish(request, Progress::step(completed, total));

            let image = load_image(&png)?;
            completed += 1;
            self.publish(request, Progress::step(completed, total));

            let page_text = self.engine.recognize(&image, &language.engine_code).await?;
            text.push_str(&page_text);
            completed += 1;
            self.publish(request, Progress::step(completed, total));
        }

        Ok((text, total))
    }

    async fn read_image(
        &self,
        data: &[u8],
        language: &OcrLanguage,
        request: &ReadRequest,
    ) -> Result<(String, u32), OcrError> {
        let image = load_image(data)?;
        self.publish(request, Progress::step(IMAGE_LOADED, IMAGE_PROGRESS_TOTAL));

        let text = self.engine.recognize(&image, &language.engine_code).await?;
        self.publish(request, Progress::step(IMAGE_EXTRACTED, IMAGE_PROGRESS_TOTAL));

        Ok((text, IMAGE_PROGRESS_TOTAL))
    }

    async fn spellcheck(&self, text: String, language: &OcrLanguage) -> Result<String, OcrError> {
        let code = language
            .dictionary_code
            .clone()
            .ok_or_else(|| OcrError::DictionaryUnavailable(language.code.clone()))?;
        let dictionaries = self.dictionaries.clone();

        // Dictionary loading and lookups are CPU-bound
        tokio::task::spawn_blocking(move || {
            let dictionary = dictionaries.dictionary(&code)?;
            Ok(correct_text(&text, dictionary.as_ref()))
        })
        .await
        .map_err(|e| OcrError::Task(format!("Spell check task failed: {}", e)))?
    }

    fn publish(&self, request: &ReadRequest, progress: Progress) {
        self.progress.publish(&request.event, &request.user, progress);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::ocr::SitePaths;
    use crate::testing::{
        sample_png, MapDictionaries, MapDictionary, MockEngine, MockRasterizer, RecordingSink,
    };

    struct Harness {
        reader: DocumentReader,
        engine: Arc<MockEngine>,
        sink: Arc<RecordingSink>,
        dir: tempfile::TempDir,
    }

    fn harness(engine: MockEngine, rasterizer: MockRasterizer) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let paths = SitePaths {
            site_path: dir.path().to_path_buf(),
            assets_root: dir.path().join("assets"),
        };
        let engine = Arc::new(engine);
        let sink = Arc::new(RecordingSink::default());
        let dictionaries = MapDictionaries::default().with(
            "en",
            MapDictionary::new(&["i", "saw", "the", "cat"], &[("teh", "the")]),
        );
        let reader = DocumentReader::new(
            FileLoader::new(paths, Duration::from_secs(5)).unwrap(),
            Arc::new(rasterizer),
            engine.clone(),
            Arc::new(dictionaries),
            sink.clone(),
        );
        Harness {
            reader,
            engine,
            sink,
            dir,
        }
    }

    fn catalog() -> LanguageCatalog {
        let mut deu = OcrLanguage::new("deu", None);
        deu.supported = false;
        LanguageCatalog::new([OcrLanguage::new("eng", Some("en")), deu])
    }

    fn write_public_file(h: &Harness, name: &str, data: &[u8]) -> String {
        let dir = h.dir.path().join("public").join("files");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), data).unwrap();
        format!("/files/{}", name)
    }

    #[tokio::test]
    async fn test_image_text_is_raw_engine_output() {
        let h = harness(MockEngine::new(&["  Raw  output\n"]), MockRasterizer::new(0));
        let path = write_public_file(&h, "scan.png", &sample_png(4, 2));

        let request = ReadRequest::new(Some(path), "alice");
        let text = h
            .reader
            .read(&request, &OcrSettings::default(), &catalog())
            .await
            .unwrap();

        assert_eq!(text.as_deref(), Some("  Raw  output\n"));
        assert_eq!(h.engine.calls.lock().clone(), vec![(4, "eng".to_string())]);
        assert_eq!(
            h.sink.progress(),
            vec![
                Progress::Started,
                Progress::step(33, 100),
                Progress::step(66, 100),
                Progress::step(100, 100),
            ]
        );
    }

    #[tokio::test]
    async fn test_pdf_pages_are_read_in_order() {
        let rasterizer = MockRasterizer::new(3);
        let rendered = rasterizer.rendered.clone();
        let h = harness(MockEngine::new(&["one ", "two ", "three"]), rasterizer);
        let path = write_public_file(&h, "doc.pdf", b"%PDF-1.4");

        let request = ReadRequest::new(Some(path), "alice");
        let text = h
            .reader
            .read(&request, &OcrSettings::default(), &catalog())
            .await
            .unwrap();

        assert_eq!(text.as_deref(), Some("one two three"));
        assert_eq!(rendered.lock().clone(), vec![0, 1, 2]);
        // Page i is i + 1 pixels wide
        let widths: Vec<u32> = h.engine.calls.lock().iter().map(|(w, _)| *w).collect();
        assert_eq!(widths, vec![1, 2, 3]);

        let progress = h.sink.progress();
        assert_eq!(progress.first(), Some(&Progress::Started));
        assert_eq!(progress.last(), Some(&Progress::step(9, 9)));
        let steps: Vec<u32> = progress
            .iter()
            .filter_map(|p| match p {
                Progress::Step { completed, total } => {
                    assert_eq!(*total, 9);
                    Some(*completed)
                }
                Progress::Started => None,
            })
            .collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 9]);
    }

    #[tokio::test]
    async fn test_spellcheck_applies_dictionary() {
        let h = harness(MockEngine::new(&["I saw teh cat"]), MockRasterizer::new(0));
        let path = write_public_file(&h, "scan.png", &sample_png(2, 2));

        let request = ReadRequest::new(Some(path), "alice").spellcheck(true);
        let text = h
            .reader
            .read(&request, &OcrSettings::default(), &catalog())
            .await
            .unwrap();

        assert_eq!(text.as_deref(), Some("I saw the cat"));
    }

    #[tokio::test]
    async fn test_unavailable_language_has_no_side_effects() {
        let h = harness(MockEngine::new(&["text"]), MockRasterizer::new(1));

        for language in ["deu", "tlh"] {
            // The file does not exist; reaching the loader would be an IO error
            let request =
                ReadRequest::new(Some("/files/missing.png".into()), "alice").language(language);
            let result = h
                .reader
                .read(&request, &OcrSettings::default(), &catalog())
                .await;

            assert!(matches!(result, Err(OcrError::LanguageUnavailable(_))));
        }
        assert_eq!(h.engine.call_count(), 0);
        assert!(h.sink.progress().is_empty());
    }

    #[tokio::test]
    async fn test_missing_path_reads_nothing() {
        let h = harness(MockEngine::new(&["text"]), MockRasterizer::new(1));
        let request = ReadRequest::new(None, "alice").language("tlh");

        let text = h
            .reader
            .read(&request, &OcrSettings::default(), &catalog())
            .await
            .unwrap();

        assert!(text.is_none());
        assert!(h.sink.progress().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_image_aborts_read() {
        let h = harness(MockEngine::new(&["text"]), MockRasterizer::new(0));
        let path = write_public_file(&h, "scan.png", b"garbage");

        let request = ReadRequest::new(Some(path), "alice");
        let result = h
            .reader
            .read(&request, &OcrSettings::default(), &catalog())
            .await;

        assert!(matches!(result, Err(OcrError::Image(_))));
        assert_eq!(h.engine.call_count(), 0);
        assert!(!h.sink.progress().iter().any(Progress::is_complete));
    }

    #[tokio::test]
    async fn test_spellcheck_without_dictionary_fails() {
        let h = harness(MockEngine::new(&["text"]), MockRasterizer::new(0));
        let path = write_public_file(&h, "scan.png", &sample_png(2, 2));
        let languages = LanguageCatalog::new([OcrLanguage::new("eng", None)]);

        let request = ReadRequest::new(Some(path), "alice").spellcheck(true);
        let result = h
            .reader
            .read(&request, &OcrSettings::default(), &languages)
            .await;

        assert!(matches!(result, Err(OcrError::DictionaryUnavailable(_))));
    }

    #[tokio::test]
    async fn test_progress_is_scoped_to_event_and_user() {
        let h = harness(MockEngine::new(&["text"]), MockRasterizer::new(0));
        let path = write_public_file(&h, "scan.png", &sample_png(2, 2));

        let request = ReadRequest::new(Some(path), "bob").event("custom_event");
        h.reader
            .read(&request, &OcrSettings::default(), &catalog())
            .await
            .unwrap();

        assert!(h
            .sink
            .events
            .lock()
            .iter()
            .all(|(event, user, _)| event == "custom_event" && user == "bob"));
    }
}
