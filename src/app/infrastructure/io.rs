//! Collaborator seams: document storage, preferences storage, clipboard and
//! shell integration.
//!
//! Controllers only ever talk to these traits. The filesystem, JSON and
//! clipboard implementations live here; the OS shell integration lives in
//! `platform`. In-memory fakes are in [`memory`].

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::error::{AppError, Result};
use crate::app::domain::Preferences;

pub const APP_DIR_NAME: &str = "mdreader";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub trait DocumentStore {
    fn read(&self, path: &str) -> Result<String>;
    fn write(&self, path: &str, content: &str) -> Result<()>;
}

pub trait PreferencesBackend {
    fn load(&self) -> Result<Preferences>;
    fn persist(&self, prefs: &Preferences) -> Result<()>;
}

pub trait Clipboard {
    /// Put `html` on the clipboard with `alt_text` as the plain-text flavour.
    fn set_rich_text(&self, html: &str, alt_text: &str) -> Result<()>;
}

pub trait ShellIntegration {
    fn register(&self) -> Result<()>;
    fn unregister(&self) -> Result<()>;
}

/// Documents on the local filesystem, read and written as UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDocumentStore;

impl DocumentStore for FsDocumentStore {
    fn read(&self, path: &str) -> Result<String> {
        fs::read_to_string(path).map_err(|e| AppError::from_io(path, e))
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        fs::write(path, content).map_err(|e| AppError::from_io(path, e))
    }
}

/// Preferences as pretty JSON in the user's config directory.
#[derive(Debug, Clone)]
pub struct JsonPreferencesFile {
    path: PathBuf,
}

impl JsonPreferencesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/mdreader/config.json`
    pub fn default_location() -> Self {
        Self::new(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferencesBackend for JsonPreferencesFile {
    fn load(&self) -> Result<Preferences> {
        let contents = fs::read_to_string(&self.path)?;
        let prefs: Preferences = serde_json::from_str(&contents)?;
        Ok(prefs.sanitized())
    }

    fn persist(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&prefs.sanitized())?;
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Write to a sibling temp file, fsync, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!("wrote {}", path.display());
    Ok(())
}

/// The system clipboard. A new handle is opened per copy; holding one for
/// the process lifetime keeps some X11 clipboards busy.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardClipboard;

impl Clipboard for ArboardClipboard {
    fn set_rich_text(&self, html: &str, alt_text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| {
            warn!("clipboard open failed: {}", e);
            AppError::ClipboardUnavailable(e.to_string())
        })?;
        clipboard
            .set_html(html, Some(alt_text))
            .map_err(|e| AppError::ClipboardUnavailable(e.to_string()))
    }
}

/// In-memory collaborators for tests and headless runs.
///
/// Each fake is cheap to clone and clones share state, so a test can keep a
/// handle for inspection after boxing one into a controller.
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::{Clipboard, DocumentStore, PreferencesBackend, ShellIntegration};
    use crate::app::domain::Preferences;
    use crate::app::infrastructure::error::{AppError, Result};

    #[derive(Debug, Default, Clone)]
    pub struct MemoryDocumentStore {
        files: Arc<Mutex<HashMap<String, String>>>,
        read_only: Arc<Mutex<bool>>,
    }

    impl MemoryDocumentStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(self, path: &str, content: &str) -> Self {
            self.insert(path, content);
            self
        }

        pub fn insert(&self, path: &str, content: &str) {
            self.files.lock().insert(path.to_string(), content.to_string());
        }

        pub fn get(&self, path: &str) -> Option<String> {
            self.files.lock().get(path).cloned()
        }

        /// Make every subsequent write fail with `PermissionDenied`.
        pub fn set_read_only(&self, read_only: bool) {
            *self.read_only.lock() = read_only;
        }
    }

    impl DocumentStore for MemoryDocumentStore {
        fn read(&self, path: &str) -> Result<String> {
            self.files
                .lock()
                .get(path)
                .cloned()
                .ok_or_else(|| AppError::NotFound(path.to_string()))
        }

        fn write(&self, path: &str, content: &str) -> Result<()> {
            if *self.read_only.lock() {
                return Err(AppError::PermissionDenied(path.to_string()));
            }
            self.insert(path, content);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct PreferencesLog {
        stored: Option<Preferences>,
        flushes: Vec<Preferences>,
        fail_writes: bool,
    }

    #[derive(Debug, Default, Clone)]
    pub struct MemoryPreferences {
        inner: Arc<Mutex<PreferencesLog>>,
    }

    impl MemoryPreferences {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_stored(prefs: Preferences) -> Self {
            let backend = Self::default();
            backend.inner.lock().stored = Some(prefs);
            backend
        }

        pub fn flush_count(&self) -> usize {
            self.inner.lock().flushes.len()
        }

        pub fn last_flushed(&self) -> Option<Preferences> {
            self.inner.lock().flushes.last().copied()
        }

        pub fn set_fail_writes(&self, fail: bool) {
            self.inner.lock().fail_writes = fail;
        }
    }

    impl PreferencesBackend for MemoryPreferences {
        fn load(&self) -> Result<Preferences> {
            self.inner
                .lock()
                .stored
                .map(Preferences::sanitized)
                .ok_or_else(|| AppError::NotFound("preferences".to_string()))
        }

        fn persist(&self, prefs: &Preferences) -> Result<()> {
            let mut inner = self.inner.lock();
            if inner.fail_writes {
                return Err(AppError::PermissionDenied("preferences".to_string()));
            }
            inner.stored = Some(*prefs);
            inner.flushes.push(*prefs);
            Ok(())
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct MemoryClipboard {
        contents: Arc<Mutex<Option<(String, String)>>>,
        unavailable: Arc<Mutex<bool>>,
    }

    impl MemoryClipboard {
        pub fn new() -> Self {
            Self::default()
        }

        /// Last `(html, alt_text)` pair copied.
        pub fn contents(&self) -> Option<(String, String)> {
            self.contents.lock().clone()
        }

        pub fn set_unavailable(&self, unavailable: bool) {
            *self.unavailable.lock() = unavailable;
        }
    }

    impl Clipboard for MemoryClipboard {
        fn set_rich_text(&self, html: &str, alt_text: &str) -> Result<()> {
            if *self.unavailable.lock() {
                return Err(AppError::ClipboardUnavailable("no clipboard".to_string()));
            }
            *self.contents.lock() = Some((html.to_string(), alt_text.to_string()));
            Ok(())
        }
    }

    #[derive(Debug, Default, Clone)]
    pub struct FakeShellIntegration {
        registered: Arc<Mutex<bool>>,
        denied: Arc<Mutex<bool>>,
    }

    impl FakeShellIntegration {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_registered(&self) -> bool {
            *self.registered.lock()
        }

        /// Simulate a user without rights to change the registration.
        pub fn set_denied(&self, denied: bool) {
            *self.denied.lock() = denied;
        }
    }

    impl ShellIntegration for FakeShellIntegration {
        fn register(&self) -> Result<()> {
            if *self.denied.lock() {
                return Err(AppError::PermissionDenied("context menu".to_string()));
            }
            *self.registered.lock() = true;
            Ok(())
        }

        fn unregister(&self) -> Result<()> {
            if *self.denied.lock() {
                return Err(AppError::PermissionDenied("context menu".to_string()));
            }
            *self.registered.lock() = false;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::{ThemeMode, WindowGeometry};
    use tempfile::TempDir;

    #[test]
    fn test_fs_store_round_trip_and_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        let path = path.to_str().unwrap();

        let store = FsDocumentStore;
        store.write(path, "# Notes").unwrap();
        assert_eq!(store.read(path).unwrap(), "# Notes");

        let missing = dir.path().join("missing.md");
        let err = store.read(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_fs_store_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.md");
        fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        let err = FsDocumentStore.read(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_json_preferences_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = JsonPreferencesFile::new(dir.path().join("mdreader").join(CONFIG_FILE_NAME));

        let prefs = Preferences {
            theme: ThemeMode::Dark,
            zoom: 130,
            window: WindowGeometry {
                width: 1400,
                height: 900,
                maximized: false,
            },
        };
        backend.persist(&prefs).unwrap();
        assert_eq!(backend.load().unwrap(), prefs);

        let mut tmp = backend.path().as_os_str().to_owned();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());
    }

    #[test]
    fn test_json_preferences_sanitizes_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{"theme":"solarized","zoom":999,"window":{"width":200,"height":100}}"#,
        )
        .unwrap();

        let prefs = JsonPreferencesFile::new(&path).load().unwrap();
        assert_eq!(prefs.theme, ThemeMode::Light);
        assert_eq!(prefs.zoom, 300);
        assert_eq!(prefs.window.width, 1024);
        assert_eq!(prefs.window.height, 768);
    }

    #[test]
    fn test_json_preferences_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonPreferencesFile::new(&path).load(),
            Err(AppError::Json(_))
        ));
    }

    #[test]
    fn test_memory_preferences_records_flushes() {
        let backend = memory::MemoryPreferences::new();
        assert!(backend.load().is_err());

        let prefs = Preferences::default();
        backend.persist(&prefs).unwrap();
        assert_eq!(backend.flush_count(), 1);
        assert_eq!(backend.load().unwrap(), prefs);

        backend.set_fail_writes(true);
        assert!(backend.persist(&prefs).is_err());
        assert_eq!(backend.flush_count(), 1);
    }
}
