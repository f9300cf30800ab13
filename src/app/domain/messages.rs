use super::document::TabId;
use super::settings::{ThemeMode, WindowGeometry};

/// Everything that can arrive on the application's event queue.
///
/// Front ends, the single-instance listener and the app itself (posted
/// continuations) all send one of these; `AppState::handle` dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // File
    OpenPaths(Vec<String>),
    NewTab,
    CloseTab(TabId),
    /// Close the tab at a 0-based position; out of range closes nothing.
    CloseIndex(usize),
    CloseActive,
    /// Save the active tab; `None` means no path could be resolved (the
    /// front end had nothing to offer), which abandons an untitled save.
    SaveActive(Option<String>),
    CopyAsRichText,

    // Tabs
    SelectTab(TabId),
    SelectIndex(usize),
    NextTab,
    PrevTab,
    SetEditMode(bool),
    ReplaceContent(String),
    AppendContent(String),
    /// Posted after the last tab closes; creates a blank tab if still empty.
    EnsureBlankTab,

    // External files
    /// Push notification: the pending queue is non-empty, drain it now.
    NewFilesAvailable,
    /// Synchronous "check now" pull from an external caller.
    CheckFiles,
    WindowFocused,
    RaiseWindow,

    // Window / preferences
    WindowGeometry(WindowGeometry),
    SetTheme(ThemeMode),
    ToggleTheme,
    SetZoom(i32),
    ZoomIn,
    ZoomOut,

    // Shell integration
    RegisterShellIntegration,
    UnregisterShellIntegration,

    Quit,
}
