use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use parking_lot::Mutex;

use super::controllers::preferences::{GeometrySampler, PreferencesStore};
use super::controllers::preview::PreviewController;
use super::controllers::tabs::{CloseOutcome, SaveOutcome, SessionManager};
use super::domain::document::{TabId, TabUpdate};
use super::domain::messages::Message;
use super::domain::settings::{PreferencesChange, ThemeMode, WindowGeometry, ZOOM_STEP};
use super::infrastructure::io::{
    ArboardClipboard, Clipboard, DocumentStore, FsDocumentStore, ShellIntegration,
};
use super::infrastructure::platform::{CONTEXT_MENU_LABEL, OsShellIntegration};
use super::services::markdown::{build_export_document, convert_to_presentation};
use super::services::pending::{PendingFileQueue, normalize_path};
use super::services::render::RenderConfig;
use super::services::text_ops::{extract_filename, html_to_plain_text};

pub const STATUS_TIMEOUT: Duration = Duration::from_secs(2);

/// The collaborators `AppState` performs I/O through.
pub struct Services {
    pub documents: Box<dyn DocumentStore>,
    pub clipboard: Box<dyn Clipboard>,
    pub shell: Box<dyn ShellIntegration>,
}

impl Services {
    pub fn system() -> Self {
        Self {
            documents: Box::new(FsDocumentStore),
            clipboard: Box::new(ArboardClipboard),
            shell: Box::new(OsShellIntegration),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StatusMessage {
    text: String,
    expires: Instant,
}

pub struct AppState {
    pub session: SessionManager,
    pub preview: PreviewController,
    pub prefs: PreferencesStore,
    pub geometry: GeometrySampler,
    pending: Arc<Mutex<PendingFileQueue>>,
    services: Services,
    sender: Sender<Message>,
    status: Option<StatusMessage>,
    alerts: VecDeque<String>,
    /// Tab whose preview was last reported visible.
    shown: Option<TabId>,
    raise_requested: bool,
}

impl AppState {
    pub fn new(
        services: Services,
        prefs: PreferencesStore,
        pending: Arc<Mutex<PendingFileQueue>>,
        sender: Sender<Message>,
    ) -> Self {
        Self {
            session: SessionManager::new(),
            preview: PreviewController::default(),
            prefs,
            geometry: GeometrySampler::default(),
            pending,
            services,
            sender,
            status: None,
            alerts: VecDeque::new(),
            shown: None,
            raise_requested: false,
        }
    }

    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.preview = PreviewController::new(config);
        self
    }

    pub fn with_geometry_sampler(mut self, sampler: GeometrySampler) -> Self {
        self.geometry = sampler;
        self
    }

    /// Shared queue handle for the single-instance listener.
    pub fn pending(&self) -> Arc<Mutex<PendingFileQueue>> {
        Arc::clone(&self.pending)
    }

    // --- Launch and file ingestion ---

    /// Queue the documents named on the command line (after the program
    /// name), open everything pending, and fall back to a blank tab.
    pub fn launch(&mut self, args: &[String], now: Instant) {
        let queued = self
            .pending
            .lock()
            .extend(args.iter().skip(1).map(String::as_str));
        debug!("launch queued {} document(s)", queued);

        self.drain_pending_files(now);
        if self.session.is_empty() {
            self.post(Message::EnsureBlankTab, now);
        }
    }

    /// Open every queued path. An empty queue changes nothing.
    pub fn drain_pending_files(&mut self, now: Instant) -> usize {
        let paths = self.pending.lock().drain();
        if paths.is_empty() {
            return 0;
        }
        self.set_status(format!("Found {} new file(s), opening...", paths.len()), now);
        for path in &paths {
            self.open_path(path, now);
        }
        paths.len()
    }

    /// Files picked in an open dialog take the same route as external files.
    pub fn open_dialog_paths(&mut self, paths: &[String], now: Instant) {
        for raw in paths {
            let path = normalize_path(raw);
            if !path.is_empty() {
                self.open_path(&path, now);
            }
        }
    }

    /// Focus the tab showing `path`, or read it into a new tab.
    pub fn open_path(&mut self, path: &str, now: Instant) -> Option<TabId> {
        if let Some(existing) = self.session.find_by_path(path) {
            self.session.set_active(existing);
            self.sync_visibility(now);
            return Some(existing);
        }

        match self.services.documents.read(path) {
            Ok(content) => {
                let len = content.chars().count();
                let id = self.session.open_or_focus(path, content);
                self.preview.content_reset(id, len, true, now);
                self.sync_visibility(now);
                self.set_status(format!("Loaded: {}", extract_filename(path)), now);
                Some(id)
            }
            Err(e) => {
                warn!("Failed to open {}: {}", path, e);
                self.set_status(format!("Failed to open {}: {}", extract_filename(path), e), now);
                None
            }
        }
    }

    // --- Tabs ---

    pub fn new_tab(&mut self, now: Instant) -> TabId {
        let id = self.session.create_blank();
        self.reset_preview(id, now);
        self.sync_visibility(now);
        id
    }

    pub fn close_tab(&mut self, id: TabId, now: Instant) {
        match self.session.close(id) {
            CloseOutcome::NotFound => return,
            CloseOutcome::Closed => {}
            CloseOutcome::ClosedLast => self.post(Message::EnsureBlankTab, now),
        }
        self.preview.remove(id);
        self.sync_visibility(now);
    }

    /// Close the tab at `index`; an index past the end closes nothing.
    pub fn close_index(&mut self, index: usize, now: Instant) {
        match self.session.id_at(index) {
            Some(id) => self.close_tab(id, now),
            None => self.set_status(format!("No tab {}", index + 1), now),
        }
    }

    /// Continuation of closing the last tab (and of a launch with nothing to open).
    pub fn ensure_blank_tab(&mut self, now: Instant) {
        if let Some(id) = self.session.ensure_not_empty() {
            self.reset_preview(id, now);
            self.sync_visibility(now);
        }
    }

    pub fn select_tab(&mut self, id: TabId, now: Instant) {
        if self.session.set_active(id) {
            self.sync_visibility(now);
        }
    }

    pub fn select_index(&mut self, index: usize, now: Instant) {
        if let Some(id) = self.session.id_at(index) {
            self.select_tab(id, now);
        }
    }

    pub fn next_tab(&mut self, now: Instant) {
        if let Some(id) = self.session.next_tab_id() {
            self.select_tab(id, now);
        }
    }

    pub fn prev_tab(&mut self, now: Instant) {
        if let Some(id) = self.session.prev_tab_id() {
            self.select_tab(id, now);
        }
    }

    pub fn set_edit_mode(&mut self, edit_mode: bool, now: Instant) {
        if let Some(id) = self.session.active_id() {
            self.session.update(id, TabUpdate::mode(edit_mode));
            self.sync_visibility(now);
        }
    }

    /// The editor replaced the active tab's text.
    pub fn replace_content(&mut self, content: String, now: Instant) {
        let Some(id) = self.session.active_id() else {
            return;
        };
        if self.session.update(id, TabUpdate::edited(content)) {
            self.reset_preview(id, now);
        }
    }

    pub fn append_content(&mut self, text: &str, now: Instant) {
        if let Some(tab) = self.session.active_tab() {
            let content = format!("{}{}", tab.content, text);
            self.replace_content(content, now);
        }
    }

    // --- Save / export ---

    /// Save the active tab. `chosen_path` is what the save dialog returned,
    /// consulted only when the tab has no path yet.
    pub fn save_active(&mut self, chosen_path: Option<String>, now: Instant) {
        let Some(id) = self.session.active_id() else {
            return;
        };
        let result = self
            .session
            .save(id, move || chosen_path, self.services.documents.as_ref());
        match result {
            Ok(SaveOutcome::Saved(_)) => self.set_status("Saved".to_string(), now),
            Ok(SaveOutcome::PathInUse(holder)) => {
                let title = self
                    .session
                    .tab(holder)
                    .map(|t| t.title.clone())
                    .unwrap_or_default();
                self.set_status(format!("Save failed: {} is open in another tab", title), now);
            }
            Ok(SaveOutcome::Cancelled) | Ok(SaveOutcome::NotFound) => {}
            Err(e) => {
                warn!("Save failed: {}", e);
                self.set_status(format!("Save failed: {}", e), now);
            }
        }
    }

    /// Copy the active document as styled HTML for word processors.
    pub fn copy_as_rich_text(&mut self, now: Instant) {
        let Some(tab) = self.session.active_tab() else {
            return;
        };
        if tab.edit_mode {
            self.set_status("Switch to preview mode to copy as rich text".to_string(), now);
            return;
        }

        let fragment = convert_to_presentation(&tab.content);
        let document = build_export_document(&fragment);
        let alt_text = html_to_plain_text(&fragment);
        match self.services.clipboard.set_rich_text(&document, &alt_text) {
            Ok(()) => self.set_status("Copied to clipboard".to_string(), now),
            Err(e) => {
                warn!("Copy failed: {}", e);
                self.set_status(format!("Copy failed: {}", e), now);
            }
        }
    }

    // --- Shell integration ---

    pub fn register_shell_integration(&mut self) {
        match self.services.shell.register() {
            Ok(()) => self.alerts.push_back(format!(
                "Context menu registered. Right-click a file and choose \"{}\".",
                CONTEXT_MENU_LABEL
            )),
            Err(e) => self
                .alerts
                .push_back(format!("Failed to register context menu: {}", e)),
        }
    }

    pub fn unregister_shell_integration(&mut self) {
        match self.services.shell.unregister() {
            Ok(()) => self.alerts.push_back("Context menu removed.".to_string()),
            Err(e) => self
                .alerts
                .push_back(format!("Failed to remove context menu: {}", e)),
        }
    }

    // --- Preferences ---

    pub fn observe_geometry(&mut self, geometry: WindowGeometry, now: Instant) {
        self.geometry.observe(geometry, now);
    }

    pub fn set_theme(&mut self, theme: ThemeMode, now: Instant) {
        self.prefs.stage(PreferencesChange::theme(theme), now);
    }

    pub fn toggle_theme(&mut self, now: Instant) {
        let theme = self.prefs.current().theme.toggled();
        self.set_theme(theme, now);
    }

    pub fn set_zoom(&mut self, zoom: i32, now: Instant) {
        self.prefs.stage(PreferencesChange::zoom(zoom), now);
    }

    pub fn zoom_by(&mut self, delta: i32, now: Instant) {
        let zoom = self.prefs.current().zoom.saturating_add(delta);
        self.set_zoom(zoom, now);
    }

    // --- Event loop ---

    /// Fire every due timer.
    pub fn tick(&mut self, now: Instant) {
        let advanced = self.preview.poll(now);
        if !advanced.is_empty() {
            debug!("render advanced for {:?}", advanced);
        }
        if let Some(geometry) = self.geometry.poll(now) {
            self.prefs.stage(PreferencesChange::window(geometry), now);
        }
        self.prefs.poll(now);
        if self.status.as_ref().is_some_and(|s| s.expires <= now) {
            self.status = None;
        }
    }

    /// Earliest pending timer across all components.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.preview.next_deadline(),
            self.geometry.next_deadline(),
            self.prefs.next_deadline(),
            self.status.as_ref().map(|s| s.expires),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Dispatch one message. Returns false when the app should quit.
    pub fn handle(&mut self, message: Message, now: Instant) -> bool {
        match message {
            Message::OpenPaths(paths) => self.open_dialog_paths(&paths, now),
            Message::NewTab => {
                self.new_tab(now);
            }
            Message::CloseTab(id) => self.close_tab(id, now),
            Message::CloseIndex(index) => self.close_index(index, now),
            Message::CloseActive => {
                if let Some(id) = self.session.active_id() {
                    self.close_tab(id, now);
                }
            }
            Message::SaveActive(path) => self.save_active(path, now),
            Message::CopyAsRichText => self.copy_as_rich_text(now),
            Message::SelectTab(id) => self.select_tab(id, now),
            Message::SelectIndex(index) => self.select_index(index, now),
            Message::NextTab => self.next_tab(now),
            Message::PrevTab => self.prev_tab(now),
            Message::SetEditMode(edit) => self.set_edit_mode(edit, now),
            Message::ReplaceContent(content) => self.replace_content(content, now),
            Message::AppendContent(text) => self.append_content(&text, now),
            Message::EnsureBlankTab => self.ensure_blank_tab(now),
            Message::NewFilesAvailable | Message::CheckFiles | Message::WindowFocused => {
                self.drain_pending_files(now);
            }
            Message::RaiseWindow => self.raise_requested = true,
            Message::WindowGeometry(geometry) => self.observe_geometry(geometry, now),
            Message::SetTheme(theme) => self.set_theme(theme, now),
            Message::ToggleTheme => self.toggle_theme(now),
            Message::SetZoom(zoom) => self.set_zoom(zoom, now),
            Message::ZoomIn => self.zoom_by(ZOOM_STEP, now),
            Message::ZoomOut => self.zoom_by(-ZOOM_STEP, now),
            Message::RegisterShellIntegration => self.register_shell_integration(),
            Message::UnregisterShellIntegration => self.unregister_shell_integration(),
            Message::Quit => {
                if self.prefs.has_pending_flush() {
                    info!("quitting with unsaved preference changes");
                }
                return false;
            }
        }
        true
    }

    // --- Front-end queries ---

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        self.alerts.drain(..).collect()
    }

    pub fn take_raise_request(&mut self) -> bool {
        std::mem::take(&mut self.raise_requested)
    }

    /// Rendered HTML of the active tab's revealed prefix, or `None` in edit mode.
    pub fn active_preview(&self) -> Option<String> {
        let tab = self.session.active_tab()?;
        if tab.edit_mode {
            return None;
        }
        Some(self.preview.render(tab.id, &tab.content))
    }

    pub fn active_progress(&self) -> Option<String> {
        self.preview.progress_label(self.session.active_id()?)
    }

    // --- Internals ---

    fn set_status(&mut self, text: String, now: Instant) {
        self.status = Some(StatusMessage {
            text,
            expires: now + STATUS_TIMEOUT,
        });
    }

    fn post(&mut self, message: Message, now: Instant) {
        if let Err(e) = self.sender.send(message) {
            // Nobody is listening; run the continuation inline.
            debug!("event queue closed, handling {:?} directly", e.0);
            self.handle(e.0, now);
        }
    }

    /// The tab whose preview is on screen: the active one, unless it is in
    /// edit mode.
    fn visible_tab(&self) -> Option<TabId> {
        self.session
            .active_tab()
            .filter(|t| !t.edit_mode)
            .map(|t| t.id)
    }

    fn reset_preview(&mut self, id: TabId, now: Instant) {
        let Some(tab) = self.session.tab(id) else {
            return;
        };
        let len = tab.content.chars().count();
        let visible = self.visible_tab() == Some(id);
        self.preview.content_reset(id, len, visible, now);
    }

    /// Report visibility changes to the preview after the active tab or its
    /// mode changed.
    fn sync_visibility(&mut self, now: Instant) {
        let visible = self.visible_tab();
        if visible == self.shown {
            return;
        }
        if let Some(old) = self.shown {
            self.preview.set_visible(old, false, now);
        }
        if let Some(new) = visible {
            self.preview.set_visible(new, true, now);
        }
        self.shown = visible;
    }
}
