//! Spell correction
//!
//! Recognized text is split into words, words unknown to the language's
//! dictionary are collected, and each one is replaced by its best suggestion.
//!
//! Replacement is a plain substring replacement over the whole text, not a
//! word-boundary one: correcting `cat` to `cot` also turns `category` into
//! `cotegory`. Existing stored results were produced this way, so it is kept.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use symspell::{SymSpell, UnicodeStringStrategy, Verbosity};
use tracing::{debug, info};

use super::types::OcrError;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid regex"));

/// Largest edit distance a suggestion may be from the misspelled word
const MAX_EDIT_DISTANCE: i64 = 2;

/// Dictionaries kept loaded at once
const DICTIONARY_CACHE_SIZE: usize = 4;

/// Split text into words, dropping punctuation.
///
/// `"Cat in gloves, catches: no mice"` -> `[Cat, in, gloves, catches, no, mice]`
pub fn words_from_text(message: &str) -> Vec<String> {
    NON_WORD
        .replace_all(message, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// A language dictionary with a correction-ranking function
pub trait SpellDictionary: Send + Sync {
    /// Words the dictionary does not know
    fn unknown(&self, words: &[String]) -> BTreeSet<String>;

    /// Best correction for a word, if the dictionary has one
    fn correction(&self, word: &str) -> Option<String>;
}

/// Replace every misspelled word in `message` with its best correction
pub fn correct_text(message: &str, dictionary: &dyn SpellDictionary) -> String {
    let words = words_from_text(message);
    let misspelled = dictionary.unknown(&words);
    debug!(words = words.len(), misspelled = misspelled.len(), "Spell checking");

    let mut corrected = message.to_string();
    for word in &misspelled {
        if let Some(replacement) = dictionary.correction(word) {
            corrected = corrected.replace(word.as_str(), &replacement);
        }
    }
    corrected
}

/// SymSpell frequency dictionary (`word count` per line)
pub struct SymSpellDictionary {
    symspell: SymSpell<UnicodeStringStrategy>,
}

impl SymSpellDictionary {
    pub fn load(path: &Path) -> Result<Self, OcrError> {
        let unavailable = || OcrError::DictionaryUnavailable(path.display().to_string());

        let corpus = path.to_str().ok_or_else(unavailable)?;
        let mut symspell: SymSpell<UnicodeStringStrategy> = SymSpell::default();
        if !symspell.load_dictionary(corpus, 0, 1, " ") {
            return Err(unavailable());
        }

        Ok(Self { symspell })
    }

    fn best(&self, word: &str) -> Option<(String, i64)> {
        self.symspell
            .lookup(&word.to_lowercase(), Verbosity::Top, MAX_EDIT_DISTANCE)
            .into_iter()
            .next()
            .map(|suggestion| (suggestion.term, suggestion.distance))
    }
}

/// Numbers and lone punctuation are never spell checked
fn is_checkable(word: &str) -> bool {
    let lone_punctuation = word.chars().count() == 1 && word.chars().all(|c| c.is_ascii_punctuation());
    !lone_punctuation && word.parse::<f64>().is_err()
}

impl SpellDictionary for SymSpellDictionary {
    fn unknown(&self, words: &[String]) -> BTreeSet<String> {
        words
            .iter()
            .map(|word| word.to_lowercase())
            .filter(|word| is_checkable(word))
            .filter(|word| !matches!(self.best(word), Some((_, 0))))
            .collect()
    }

    fn correction(&self, word: &str) -> Option<String> {
        self.best(word)
            .filter(|(_, distance)| *distance > 0)
            .map(|(term, _)| term)
    }
}

/// Resolves a dictionary code to a loaded dictionary
pub trait DictionaryProvider: Send + Sync {
    fn dictionary(&self, code: &str) -> Result<Arc<dyn SpellDictionary>, OcrError>;
}

/// Loads `<dir>/<code>.txt` SymSpell dictionaries and keeps recent ones in memory
pub struct DictionaryStore {
    dir: PathBuf,
    cache: Mutex<LruCache<String, Arc<dyn SpellDictionary>>>,
}

impl DictionaryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let capacity = NonZeroUsize::new(DICTIONARY_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            dir: dir.into(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn path_for(&self, code: &str) -> Option<PathBuf> {
        let valid = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| self.dir.join(format!("{}.txt", code)))
    }
}

impl DictionaryProvider for DictionaryStore {
    fn dictionary(&self, code: &str) -> Result<Arc<dyn SpellDictionary>, OcrError> {
        if let Some(dictionary) = self.cache.lock().get(code) {
            return Ok(dictionary.clone());
        }

        let path = self
            .path_for(code)
            .ok_or_else(|| OcrError::DictionaryUnavailable(code.to_string()))?;
        if !path.is_file() {
            return Err(OcrError::DictionaryUnavailable(code.to_string()));
        }

        info!(code, path = %path.display(), "Loading spell-check dictionary");
        let dictionary: Arc<dyn SpellDictionary> = Arc::new(SymSpellDictionary::load(&path)?);
        self.cache.lock().put(code.to_string(), dictionary.clone());
        Ok(dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MapDictionary;

    #[test]
    fn test_words_from_text() {
        assert_eq!(
            words_from_text("Cat in gloves, catches: no mice"),
            vec!["Cat", "in", "gloves", "catches", "no", "mice"]
        );
        assert!(words_from_text("  ... !!! ").is_empty());
    }

    #[test]
    fn test_correct_text() {
        let dictionary = MapDictionary::new(&["i", "saw", "the", "cat"], &[("teh", "the")]);
        assert_eq!(correct_text("I saw teh cat", &dictionary), "I saw the cat");
    }

    #[test]
    fn test_correct_text_replaces_substrings() {
        let dictionary = MapDictionary::new(&["category"], &[("cat", "cot")]);
        assert_eq!(correct_text("category cat", &dictionary), "cotegory cot");
    }

    #[test]
    fn test_word_without_correction_is_left_alone() {
        let dictionary = MapDictionary::new(&["hello"], &[]);
        assert_eq!(correct_text("hello xqzv", &dictionary), "hello xqzv");
    }

    fn write_dictionary(dir: &Path, code: &str) {
        std::fs::write(
            dir.join(format!("{}.txt", code)),
            "the 23135851162\nsaw 3016474\ncat 21806869\ni 3086225277\n",
        )
        .unwrap();
    }

    #[test]
    fn test_symspell_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        write_dictionary(dir.path(), "en");
        let dictionary = SymSpellDictionary::load(&dir.path().join("en.txt")).unwrap();

        let words = words_from_text("I saw teh cat");
        assert_eq!(
            dictionary.unknown(&words),
            BTreeSet::from(["teh".to_string()])
        );
        assert_eq!(dictionary.correction("teh").as_deref(), Some("the"));
        assert_eq!(correct_text("I saw teh cat", &dictionary), "I saw the cat");
    }

    #[test]
    fn test_symspell_leaves_numbers_alone() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("en.txt"),
            "the 23135851162\ni 3086225277\na 9081174698\ntotal 185036146\nitems 77580765\nin 8469404971\n",
        )
        .unwrap();
        let dictionary = SymSpellDictionary::load(&dir.path().join("en.txt")).unwrap();

        let words = words_from_text("Total 12 items in 2012");
        assert!(dictionary.unknown(&words).is_empty());
        assert_eq!(
            correct_text("Total 12 items in 2012", &dictionary),
            "Total 12 items in 2012"
        );
    }

    #[test]
    fn test_is_checkable() {
        assert!(is_checkable("teh"));
        assert!(!is_checkable("12"));
        assert!(!is_checkable("3.5"));
        assert!(!is_checkable("nan"));
        assert!(!is_checkable("_"));
    }

    #[test]
    fn test_store_caches_dictionaries() {
        let dir = tempfile::tempdir().unwrap();
        write_dictionary(dir.path(), "en");
        let store = DictionaryStore::new(dir.path());

        let first = store.dictionary("en").unwrap();
        let second = store.dictionary("en").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_store_rejects_missing_and_invalid_codes() {
        let dir = tempfile::tempdir().unwrap();
        let store = DictionaryStore::new(dir.path());

        assert!(matches!(
            store.dictionary("fr"),
            Err(OcrError::DictionaryUnavailable(_))
        ));
        assert!(matches!(
            store.dictionary("../etc/passwd"),
            Err(OcrError::DictionaryUnavailable(_))
        ));
    }
}
