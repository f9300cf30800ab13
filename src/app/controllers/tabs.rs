use log::{debug, info, warn};

use crate::app::domain::document::{Tab, TabId, TabIdGenerator, TabUpdate};
use crate::app::infrastructure::error::Result;
use crate::app::infrastructure::io::DocumentStore;
use crate::app::services::text_ops::{ensure_markdown_extension, extract_filename};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    NotFound,
    Closed,
    /// The session is now empty; the caller must post a blank-tab
    /// continuation rather than create one inside the same update.
    ClosedLast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(String),
    /// No path was chosen; nothing changed.
    Cancelled,
    /// The chosen path is already shown by another tab; nothing changed.
    PathInUse(TabId),
    NotFound,
}

/// The ordered set of open tabs plus the active pointer.
///
/// `active_id` is `Some` exactly when `tabs` is non-empty.
#[derive(Debug, Default)]
pub struct SessionManager {
    tabs: Vec<Tab>,
    active_id: Option<TabId>,
    ids: TabIdGenerator,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus the tab already showing `path`, or append a new one.
    ///
    /// An existing tab keeps its content untouched.
    pub fn open_or_focus(&mut self, path: &str, content: String) -> TabId {
        if let Some(existing) = self.find_by_path(path) {
            debug!("focus existing tab {} for {}", existing, path);
            self.active_id = Some(existing);
            return existing;
        }
        let id = self.ids.next_id();
        self.tabs.push(Tab::new_from_file(id, path.to_string(), content));
        self.active_id = Some(id);
        info!("opened {} as tab {}", path, id);
        id
    }

    pub fn create_blank(&mut self) -> TabId {
        let id = self.ids.next_id();
        self.tabs.push(Tab::new_untitled(id));
        self.active_id = Some(id);
        id
    }

    /// Remove a tab. When it was active, the last remaining tab becomes active.
    pub fn close(&mut self, id: TabId) -> CloseOutcome {
        let idx = match self.tabs.iter().position(|t| t.id == id) {
            Some(i) => i,
            None => return CloseOutcome::NotFound,
        };
        self.tabs.remove(idx);

        if self.active_id == Some(id) {
            self.active_id = self.tabs.last().map(|t| t.id);
        }
        if self.tabs.is_empty() {
            CloseOutcome::ClosedLast
        } else {
            CloseOutcome::Closed
        }
    }

    /// Create a blank tab if the session is empty.
    pub fn ensure_not_empty(&mut self) -> Option<TabId> {
        if self.tabs.is_empty() {
            Some(self.create_blank())
        } else {
            None
        }
    }

    /// Apply a partial update to one tab. Returns true when its content was
    /// replaced; an unknown id is a no-op. A path already held by another tab
    /// is dropped from the update.
    pub fn update(&mut self, id: TabId, mut update: TabUpdate) -> bool {
        if let Some(path) = update.file_path.as_deref()
            && let Some(holder) = self.find_by_path(path)
            && holder != id
        {
            warn!("tab {} already shows {}, keeping path of tab {}", holder, path, id);
            update.file_path = None;
            update.title = None;
        }
        match self.tab_mut(id) {
            Some(tab) => tab.apply(update),
            None => false,
        }
    }

    /// Persist a tab's content.
    ///
    /// An untitled tab asks `resolve_path` for a destination; `None` abandons
    /// the save, as does a path another tab already shows. A chosen path
    /// (with `.md` appended when missing) is recorded on the tab before the
    /// write, so it sticks even if the write fails.
    pub fn save(
        &mut self,
        id: TabId,
        resolve_path: impl FnOnce() -> Option<String>,
        store: &dyn DocumentStore,
    ) -> Result<SaveOutcome> {
        let Some(tab) = self.tab(id) else {
            return Ok(SaveOutcome::NotFound);
        };

        let path = match tab.file_path.clone().filter(|p| !p.is_empty()) {
            Some(path) => path,
            None => {
                let Some(chosen) = resolve_path().filter(|p| !p.trim().is_empty()) else {
                    debug!("save of tab {} cancelled", id);
                    return Ok(SaveOutcome::Cancelled);
                };
                let path = ensure_markdown_extension(chosen.trim());
                if let Some(holder) = self.find_by_path(&path) {
                    debug!("save of tab {} refused, {} is open in tab {}", id, path, holder);
                    return Ok(SaveOutcome::PathInUse(holder));
                }
                self.update(
                    id,
                    TabUpdate {
                        file_path: Some(path.clone()),
                        title: Some(extract_filename(&path)),
                        ..Default::default()
                    },
                );
                path
            }
        };

        let Some(tab) = self.tab_mut(id) else {
            return Ok(SaveOutcome::NotFound);
        };
        store.write(&path, &tab.content)?;
        tab.dirty = false;
        info!("saved tab {} to {}", id, path);
        Ok(SaveOutcome::Saved(path))
    }

    pub fn set_active(&mut self, id: TabId) -> bool {
        if self.tabs.iter().any(|t| t.id == id) {
            self.active_id = Some(id);
            true
        } else {
            false
        }
    }

    pub fn find_by_path(&self, path: &str) -> Option<TabId> {
        if path.is_empty() {
            return None;
        }
        self.tabs
            .iter()
            .find(|t| t.file_path.as_deref() == Some(path))
            .map(|t| t.id)
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active_id
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        let active_id = self.active_id?;
        self.tab(active_id)
    }

    pub fn id_at(&self, index: usize) -> Option<TabId> {
        self.tabs.get(index).map(|t| t.id)
    }

    /// Get the next tab id (for tab cycling)
    pub fn next_tab_id(&self) -> Option<TabId> {
        let active_id = self.active_id?;
        let idx = self.tabs.iter().position(|t| t.id == active_id)?;
        let next_idx = (idx + 1) % self.tabs.len();
        Some(self.tabs[next_idx].id)
    }

    /// Get the previous tab id (for tab cycling)
    pub fn prev_tab_id(&self) -> Option<TabId> {
        let active_id = self.active_id?;
        let idx = self.tabs.iter().position(|t| t.id == active_id)?;
        let prev_idx = if idx == 0 { self.tabs.len() - 1 } else { idx - 1 };
        Some(self.tabs[prev_idx].id)
    }
}
