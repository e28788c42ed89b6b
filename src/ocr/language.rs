//! Language availability
//!
//! Snapshot of the OCR Language table handed to the reader for one invocation.

use std::collections::HashMap;

use super::types::{OcrError, OcrLanguage};

/// Languages known to the service, keyed by internal code
#[derive(Debug, Clone, Default)]
pub struct LanguageCatalog {
    languages: HashMap<String, OcrLanguage>,
}

impl LanguageCatalog {
    pub fn new(languages: impl IntoIterator<Item = OcrLanguage>) -> Self {
        Self {
            languages: languages
                .into_iter()
                .map(|lang| (lang.code.clone(), lang))
                .collect(),
        }
    }

    /// Fail unless the language is configured and supported by the engine
    pub fn ensure_available(&self, code: &str) -> Result<&OcrLanguage, OcrError> {
        match self.languages.get(code) {
            Some(lang) if lang.supported => Ok(lang),
            _ => Err(OcrError::LanguageUnavailable(code.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> LanguageCatalog {
        let mut fra = OcrLanguage::new("fra", Some("fr"));
        fra.supported = false;
        LanguageCatalog::new([OcrLanguage::new("eng", Some("en")), fra])
    }

    #[test]
    fn test_supported_language_is_available() {
        let catalog = catalog();
        let lang = catalog.ensure_available("eng").unwrap();
        assert_eq!(lang.dictionary_code.as_deref(), Some("en"));
    }

    #[test]
    fn test_unsupported_language_is_rejected() {
        let catalog = catalog();
        assert!(matches!(
            catalog.ensure_available("fra"),
            Err(OcrError::LanguageUnavailable(code)) if code == "fra"
        ));
        assert!(catalog.ensure_available("eng").is_ok());
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        assert!(catalog().ensure_available("klingon").is_err());
    }
}
