//! Stored-file resolution
//!
//! Maps a stored-file reference to something we can read bytes from. References
//! are dispatched purely on their prefix:
//!
//! | prefix              | resolves to                           |
//! |---------------------|---------------------------------------|
//! | `/assets/...`       | `<assets_root>/...`                   |
//! | `/files/...`        | `<site_path>/public/files/...`        |
//! | `/private/files/...`| `<site_path>/private/files/...`       |
//! | `/...`              | the absolute local path itself        |
//! | anything else       | a remote URL, fetched over HTTP       |

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::types::OcrError;

/// Filesystem roots stored-file references are resolved against
#[derive(Debug, Clone)]
pub struct SitePaths {
    /// Site directory holding `public/files` and `private/files`
    pub site_path: PathBuf,
    /// Directory served under `/assets/`
    pub assets_root: PathBuf,
}

impl Default for SitePaths {
    fn default() -> Self {
        Self {
            site_path: PathBuf::from("./site"),
            assets_root: PathBuf::from("/assets"),
        }
    }
}

/// A resolved stored-file reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    Local(PathBuf),
    Remote(String),
}

impl FileRef {
    /// Resolve a raw reference. No validation beyond prefix matching.
    pub fn resolve(path: &str, paths: &SitePaths) -> Self {
        if let Some(rest) = path.strip_prefix("/assets/") {
            Self::Local(normalize(&paths.assets_root.join(rest)))
        } else if path.starts_with("/files/") {
            Self::Local(normalize(
                &paths.site_path.join("public").join(path.trim_start_matches('/')),
            ))
        } else if path.starts_with("/private/files/") {
            Self::Local(normalize(&paths.site_path.join(path.trim_start_matches('/'))))
        } else if path.starts_with('/') {
            Self::Local(normalize(Path::new(path)))
        } else {
            Self::Remote(path.to_string())
        }
    }
}

/// Whether a raw reference names a PDF (decided on the reference, not the content)
pub fn is_pdf(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".pdf")
}

/// Lexically normalize `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Reads the bytes behind a [`FileRef`]
#[derive(Clone)]
pub struct FileLoader {
    client: reqwest::Client,
    paths: SitePaths,
}

impl FileLoader {
    pub fn new(paths: SitePaths, fetch_timeout: Duration) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self { client, paths })
    }

    pub fn resolve(&self, path: &str) -> FileRef {
        FileRef::resolve(path, &self.paths)
    }

    /// Load the referenced file.
    ///
    /// Remote responses are read as-is; a non-OK status is not treated as an error
    /// here and surfaces later when the body fails to decode.
    pub async fn load(&self, file: &FileRef) -> Result<Vec<u8>, OcrError> {
        match file {
            FileRef::Local(path) => {
                debug!(path = %path.display(), "Reading local file");
                Ok(tokio::fs::read(path).await?)
            }
            FileRef::Remote(url) => {
                debug!(%url, "Fetching remote file");
                let response = self.client.get(url).send().await?;
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}
