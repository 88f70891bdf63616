//! Source resolution: decide whether a batch item is read from disk or
//! fetched from a URL, and derive its output stem.
//!
//! Items are plain strings as the user supplied them. Three shapes send an
//! item to the extractor's URL mode:
//!
//! - a direct `http://` / `https://` URL
//! - a `.url` internet shortcut (the value of its first `URL=` line)
//! - a `.txt` file whose content points at a video-sharing page
//!
//! Everything else, including shortcut files that cannot be read, goes to
//! file mode.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions the batch accepts. Matching is case-insensitive.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "xlsx", "pptx", "jpg", "jpeg", "png", "gif", "bmp", "html", "htm", "txt", "csv",
    "json", "xml", "epub", "mp3", "wav", "m4a", "zip", "url", "md",
];

const VIDEO_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// Where an item's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    /// Read through the extractor's file mode.
    Local(PathBuf),
    /// Fetched through the extractor's URL mode. `origin` is what the user
    /// supplied (the URL itself, or the shortcut file that named it).
    Remote { url: String, origin: String },
}

impl ResolvedInput {
    /// Output file stem, without extension.
    pub fn stem(&self) -> String {
        match self {
            ResolvedInput::Local(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "untitled".to_string()),
            ResolvedInput::Remote { origin, .. } if !is_url(origin) => {
                ResolvedInput::Local(PathBuf::from(origin)).stem()
            }
            ResolvedInput::Remote { url, .. } => url_stem(url),
        }
    }

    /// Format hint handed to the enhancer: `".md"`, `".pdf"`, or `""` for
    /// fetched content.
    pub fn extension(&self) -> String {
        match self {
            ResolvedInput::Local(path) => dotted_extension(path),
            ResolvedInput::Remote { .. } => String::new(),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// `http(s)` URL on a recognised video-sharing host.
pub fn is_video_url(input: &str) -> bool {
    if !is_url(input) {
        return false;
    }
    let Ok(parsed) = reqwest::Url::parse(input) else {
        return false;
    };
    parsed.host_str().is_some_and(|host| {
        VIDEO_HOSTS
            .iter()
            .any(|v| host == *v || host.ends_with(&format!(".{v}")))
    })
}

/// True when `path` has one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Decide how `source` is read.
pub async fn resolve_source(source: &str) -> ResolvedInput {
    if is_url(source) {
        return ResolvedInput::Remote {
            url: source.to_string(),
            origin: source.to_string(),
        };
    }

    let path = PathBuf::from(source);
    let ext = dotted_extension(&path);
    if ext == ".url" || ext == ".txt" {
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                if let Some(url) = shortcut_target(&ext, &content) {
                    debug!("{} points at {}", path.display(), url);
                    return ResolvedInput::Remote {
                        url,
                        origin: source.to_string(),
                    };
                }
            }
            Err(e) => debug!("cannot read {} as shortcut: {}", path.display(), e),
        }
    }

    ResolvedInput::Local(path)
}

/// URL named by a `.url` shortcut or a `.txt` file, if any.
pub fn shortcut_target(ext: &str, content: &str) -> Option<String> {
    match ext {
        ".url" => content
            .lines()
            .find_map(|line| line.trim().strip_prefix("URL="))
            .map(str::trim)
            .filter(|url| is_url(url))
            .map(str::to_string),
        ".txt" => {
            if let Some(token) = content.split_whitespace().find(|t| is_video_url(t)) {
                return Some(token.to_string());
            }
            // A single unparseable line naming a video host.
            let trimmed = content.trim();
            let names_host = VIDEO_HOSTS.iter().any(|h| trimmed.contains(h));
            (names_host && is_url(trimmed) && !trimmed.contains(char::is_whitespace))
                .then(|| trimmed.to_string())
        }
        _ => None,
    }
}

/// Filesystem-safe stem for a URL: scheme dropped, forbidden chars → `_`.
pub fn url_stem(url: &str) -> String {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let cleaned: String = rest
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
