//! Extraction seam: path or URL → raw text.
//!
//! The real document parsers (PDF, Office, audio transcription, …) live
//! outside this crate. They plug in through [`Extractor`]. The bundled
//! [`BuiltinExtractor`] covers text-like files and plain HTTP downloads, which
//! is enough for the CLI to be useful on its own and for the batch pipeline
//! to be tested end to end.

use crate::error::ExtractError;
use crate::pipeline::input::ResolvedInput;
use futures::future::{BoxFuture, FutureExt};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default URL-mode download timeout.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// File formats [`BuiltinExtractor`] reads as text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "csv", "tsv", "json", "xml", "html", "htm", "log", "rst", "yaml", "yml",
];

/// Turns a file or URL into raw text.
///
/// Implementations must be `Send + Sync`: one extractor is shared by every
/// worker in a batch. Calls may be slow and may fail for any reason; the
/// batch treats each failure as that item's failure only.
pub trait Extractor: Send + Sync {
    /// Read a local file.
    fn extract_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String, ExtractError>>;

    /// Fetch and read a URL.
    fn extract_url<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, ExtractError>>;
}

/// Extracted text plus the format hint the enhancer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub text: String,
    /// `".md"`, `".pdf"`, … or `""` for URL content.
    pub source_extension: String,
}

/// Run the extractor mode matching `input`.
pub async fn extract(
    input: &ResolvedInput,
    extractor: &dyn Extractor,
) -> Result<RawDocument, ExtractError> {
    let text = match input {
        ResolvedInput::Local(path) => extractor.extract_file(path).await?,
        ResolvedInput::Remote { url, .. } => extractor.extract_url(url).await?,
    };
    Ok(RawDocument {
        text,
        source_extension: input.extension(),
    })
}

/// Reads text-like files and downloads URL bodies.
#[derive(Debug, Clone)]
pub struct BuiltinExtractor {
    download_timeout_secs: u64,
}

impl Default for BuiltinExtractor {
    fn default() -> Self {
        Self {
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

impl BuiltinExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeout for URL-mode downloads, in seconds (minimum 1).
    pub fn with_download_timeout(mut self, secs: u64) -> Self {
        self.download_timeout_secs = secs.max(1);
        self
    }

    async fn read_file(&self, path: &Path) -> Result<String, ExtractError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ExtractError::Unsupported {
                extension: format!(".{ext}"),
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExtractError::NotFound {
                path: path.to_path_buf(),
            },
            ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ExtractError::Io(e),
        })?;

        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn download(&self, url: &str) -> Result<String, ExtractError> {
        info!("Downloading: {}", url);
        let secs = self.download_timeout_secs;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()
            .map_err(|e| ExtractError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                ExtractError::Timeout {
                    url: url.to_string(),
                    secs,
                }
            } else {
                ExtractError::Download {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let response = client.get(url).send().await.map_err(map_err)?;
        if !response.status().is_success() {
            return Err(ExtractError::Download {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let text = response.text().await.map_err(map_err)?;
        debug!("Downloaded {} bytes from {}", text.len(), url);
        Ok(text)
    }
}

impl Extractor for BuiltinExtractor {
    fn extract_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String, ExtractError>> {
        self.read_file(path).boxed()
    }

    fn extract_url<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, ExtractError>> {
        self.download(url).boxed()
    }
}
