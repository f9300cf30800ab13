use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::services::text_ops::extract_filename;

pub const UNTITLED_TITLE: &str = "Untitled";
pub const WELCOME_CONTENT: &str = "# Welcome to MdReader\n\nOpen a file or start editing.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out tab ids derived from the wall clock (milliseconds, shifted to
/// leave room for a sequence), bumped past the last issued id so two tabs
/// created in the same millisecond never collide.
#[derive(Debug, Default)]
pub struct TabIdGenerator {
    last: u64,
}

impl TabIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> TabId {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let candidate = millis << 10;
        self.last = if candidate > self.last { candidate } else { self.last + 1 };
        TabId(self.last)
    }
}

/// One open document.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    /// Absolute path, `None` while the tab has never been saved.
    pub file_path: Option<String>,
    pub content: String,
    pub edit_mode: bool,
    pub dirty: bool,
}

impl Tab {
    pub fn new_untitled(id: TabId) -> Self {
        Self {
            id,
            title: UNTITLED_TITLE.to_string(),
            file_path: None,
            content: WELCOME_CONTENT.to_string(),
            edit_mode: false,
            dirty: false,
        }
    }

    pub fn new_from_file(id: TabId, path: String, content: String) -> Self {
        Self {
            id,
            title: extract_filename(&path),
            file_path: Some(path),
            content,
            edit_mode: false,
            dirty: false,
        }
    }

    pub fn has_path(&self) -> bool {
        self.file_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Apply a partial update. Returns true when the content was replaced.
    pub fn apply(&mut self, update: TabUpdate) -> bool {
        let mut content_changed = false;
        if let Some(content) = update.content {
            self.content = content;
            content_changed = true;
        }
        if let Some(edit_mode) = update.edit_mode {
            self.edit_mode = edit_mode;
        }
        if let Some(dirty) = update.dirty {
            self.dirty = dirty;
        }
        if let Some(path) = update.file_path {
            self.file_path = if path.is_empty() { None } else { Some(path) };
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        content_changed
    }
}

/// Partial change to a [`Tab`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabUpdate {
    pub content: Option<String>,
    pub edit_mode: Option<bool>,
    pub dirty: Option<bool>,
    pub file_path: Option<String>,
    pub title: Option<String>,
}

impl TabUpdate {
    /// An edit from the text widget: new content, marked dirty.
    pub fn edited(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            dirty: Some(true),
            ..Default::default()
        }
    }

    pub fn mode(edit_mode: bool) -> Self {
        Self {
            edit_mode: Some(edit_mode),
            ..Default::default()
        }
    }
}
