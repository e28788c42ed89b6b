//! Configuration management for the OCR server

use std::env;
use std::path::PathBuf;

use crate::ocr::{OcrLanguage, DEFAULT_PDF_RESOLUTION};

/// Languages seeded into an empty database: `code[:dictionary]`, comma separated
const DEFAULT_LANGUAGES: &str = "eng:en,fra:fr,deu:de,spa:es,ita:it,por:pt";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Site directory holding `public/files` and `private/files`
    pub site_path: PathBuf,
    /// Directory `/assets/...` references resolve under
    pub assets_root: PathBuf,
    pub tesseract_cmd: String,
    /// Directory of `<code>.txt` frequency dictionaries
    pub dictionary_dir: PathBuf,
    /// Resolution stored in OCR Settings until an admin changes it
    pub default_pdf_resolution: u32,
    pub fetch_timeout_secs: u64,
    pub default_languages: Vec<OcrLanguage>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./ocr.db".to_string(),
            },
            ocr: OcrConfig {
                site_path: PathBuf::from("./site"),
                assets_root: PathBuf::from("/assets"),
                tesseract_cmd: "tesseract".to_string(),
                dictionary_dir: PathBuf::from("./dictionaries"),
                default_pdf_resolution: DEFAULT_PDF_RESOLUTION,
                fetch_timeout_secs: 60,
                default_languages: parse_languages(DEFAULT_LANGUAGES),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build a config from an arbitrary variable source; unset variables take defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let string = |var: &str, default: String| lookup(var).unwrap_or(default);
        let path = |var: &str, default: PathBuf| lookup(var).map(PathBuf::from).unwrap_or(default);

        Ok(Config {
            server: ServerConfig {
                host: string("SERVER_HOST", defaults.server.host),
                port: parse_var(&lookup, "SERVER_PORT", defaults.server.port)?,
            },
            database: DatabaseConfig {
                url: string("DATABASE_URL", defaults.database.url),
            },
            ocr: OcrConfig {
                site_path: path("OCR_SITE_PATH", defaults.ocr.site_path),
                assets_root: path("OCR_ASSETS_ROOT", defaults.ocr.assets_root),
                tesseract_cmd: string("OCR_TESSERACT_CMD", defaults.ocr.tesseract_cmd),
                dictionary_dir: path("OCR_DICTIONARY_DIR", defaults.ocr.dictionary_dir),
                default_pdf_resolution: parse_var(
                    &lookup,
                    "OCR_DEFAULT_PDF_RESOLUTION",
                    defaults.ocr.default_pdf_resolution,
                )?,
                fetch_timeout_secs: parse_var(
                    &lookup,
                    "OCR_FETCH_TIMEOUT_SECS",
                    defaults.ocr.fetch_timeout_secs,
                )?,
                default_languages: lookup("OCR_DEFAULT_LANGUAGES")
                    .map(|value| parse_languages(&value))
                    .unwrap_or(defaults.ocr.default_languages),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}

/// Parse `eng:en,fra:fr,chi_sim` into language mappings
pub fn parse_languages(value: &str) -> Vec<OcrLanguage> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((code, dictionary)) => {
                let dictionary = dictionary.trim();
                OcrLanguage::new(code.trim(), (!dictionary.is_empty()).then_some(dictionary))
            }
            None => OcrLanguage::new(entry, None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_languages() {
        let langs = parse_languages("eng:en, chi_sim ,fra:");
        assert_eq!(langs.len(), 3);
        assert_eq!(langs[0].dictionary_code.as_deref(), Some("en"));
        assert_eq!(langs[1].code, "chi_sim");
        assert!(langs[1].dictionary_code.is_none());
        assert!(langs[2].dictionary_code.is_none());
    }

    #[test]
    fn test_from_lookup_overrides_and_defaults() {
        let vars: HashMap<&str, &str> = [
            ("SERVER_PORT", "8080"),
            ("OCR_DEFAULT_PDF_RESOLUTION", "150"),
            ("OCR_DEFAULT_LANGUAGES", "eng:en"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|var| vars.get(var).map(|v| v.to_string())).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.ocr.default_pdf_resolution, 150);
        assert_eq!(config.ocr.fetch_timeout_secs, 60);
        assert_eq!(config.ocr.default_languages.len(), 1);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let result = Config::from_lookup(|var| (var == "SERVER_PORT").then(|| "http".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { var: "SERVER_PORT", .. })
        ));
    }
}
