//! Files handed to us from outside the current event cycle.
//!
//! Paths arrive from launch arguments and from a second process instance.
//! They are normalised on entry, deduplicated, and handed out in arrival
//! order by `drain`.

use std::collections::VecDeque;

use url::Url;

/// Extensions recognised as markdown documents (compared case-insensitively).
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

const FILE_URI_PREFIX: &str = "file://";

/// Clean up a path as delivered by a shell, a launcher or a file manager.
///
/// Trims whitespace, strips wrapping quotes and turns a `file://` URI into a
/// native path (percent-decoded).
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if trimmed
        .get(..FILE_URI_PREFIX.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(FILE_URI_PREFIX))
    {
        return file_uri_to_path(trimmed);
    }
    trimmed.to_string()
}

fn file_uri_to_path(uri: &str) -> String {
    if let Ok(url) = Url::parse(uri)
        && let Ok(path) = url.to_file_path()
    {
        return path.to_string_lossy().to_string();
    }
    // Not a well-formed URI: keep what follows the scheme.
    uri[FILE_URI_PREFIX.len()..].to_string()
}

/// Whether the (normalised) path names a markdown document.
pub fn is_markdown_path(path: &str) -> bool {
    let lower = normalize_path(path).to_lowercase();
    MARKDOWN_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

#[derive(Debug, Default)]
pub struct PendingFileQueue {
    paths: VecDeque<String>,
}

impl PendingFileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a path. Returns false when it is not a markdown document or is
    /// already waiting in the queue.
    pub fn push(&mut self, raw: &str) -> bool {
        let path = normalize_path(raw);
        if path.is_empty() || !is_markdown_path(&path) {
            return false;
        }
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push_back(path);
        true
    }

    /// Queue every markdown path in `raws`, returning how many were added.
    pub fn extend<'a>(&mut self, raws: impl IntoIterator<Item = &'a str>) -> usize {
        raws.into_iter().filter(|raw| self.push(raw)).count()
    }

    /// Take everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        self.paths.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
