use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const MIN_ZOOM: i32 = 50;
pub const MAX_ZOOM: i32 = 300;
pub const ZOOM_STEP: i32 = 10;

const MIN_WINDOW_WIDTH: u32 = 900;
const MIN_WINDOW_HEIGHT: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Anything other than "dark" reads as light.
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("dark") {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }
}

impl Serialize for ThemeMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ThemeMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ThemeMode::parse_lenient(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub maximized: bool,
}

fn default_width() -> u32 {
    1024
}

fn default_height() -> u32 {
    768
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            maximized: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: ThemeMode,

    #[serde(default = "default_zoom")]
    pub zoom: i32,

    #[serde(default)]
    pub window: WindowGeometry,
}

fn default_zoom() -> i32 {
    100
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            zoom: default_zoom(),
            window: WindowGeometry::default(),
        }
    }
}

impl Preferences {
    /// Bring untrusted values (a persisted file, a UI event) into range.
    pub fn sanitized(mut self) -> Self {
        self.zoom = clamp_zoom(self.zoom);
        if self.window.width < MIN_WINDOW_WIDTH {
            self.window.width = default_width();
        }
        if self.window.height < MIN_WINDOW_HEIGHT {
            self.window.height = default_height();
        }
        self
    }

    /// Merge a partial change into these preferences.
    ///
    /// A maximized geometry keeps the previous width/height so that
    /// un-maximizing can restore the last normal size.
    pub fn merge(&mut self, change: &PreferencesChange) {
        if let Some(theme) = change.theme {
            self.theme = theme;
        }
        if let Some(zoom) = change.zoom {
            self.zoom = clamp_zoom(zoom);
        }
        if let Some(window) = change.window {
            if window.maximized {
                self.window.maximized = true;
            } else {
                self.window = window;
            }
        }
    }
}

pub fn clamp_zoom(zoom: i32) -> i32 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// A partial preferences update staged by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PreferencesChange {
    pub theme: Option<ThemeMode>,
    pub zoom: Option<i32>,
    pub window: Option<WindowGeometry>,
}

impl PreferencesChange {
    pub fn theme(theme: ThemeMode) -> Self {
        Self {
            theme: Some(theme),
            ..Default::default()
        }
    }

    pub fn zoom(zoom: i32) -> Self {
        Self {
            zoom: Some(zoom),
            ..Default::default()
        }
    }

    pub fn window(window: WindowGeometry) -> Self {
        Self {
            window: Some(window),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let prefs = Preferences::default();
        assert_eq!(prefs.theme, ThemeMode::Light);
        assert_eq!(prefs.zoom, 100);
        assert_eq!(prefs.window.width, 1024);
        assert_eq!(prefs.window.height, 768);
        assert!(!prefs.window.maximized);
    }

    #[test]
    fn test_serialize_deserialize() {
        let prefs = Preferences {
            theme: ThemeMode::Dark,
            zoom: 150,
            window: WindowGeometry {
                width: 1280,
                height: 900,
                maximized: true,
            },
        };
        let json = serde_json::to_string(&prefs).unwrap();
        assert!(json.contains("\"dark\""));
        let loaded: Preferences = serde_json::from_str(&json).unwrap();
        assert_eq!(prefs, loaded);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{"zoom": 120}"#;
        let prefs: Preferences = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.zoom, 120);
        assert_eq!(prefs.theme, ThemeMode::Light);
        assert_eq!(prefs.window, WindowGeometry::default());
    }

    #[test]
    fn test_unknown_theme_reads_as_light() {
        let json = r#"{"theme": "solarized"}"#;
        let prefs: Preferences = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.theme, ThemeMode::Light);
    }

    #[test]
    fn test_sanitize_clamps_zoom_and_window() {
        let prefs = Preferences {
            theme: ThemeMode::Dark,
            zoom: 1000,
            window: WindowGeometry {
                width: 320,
                height: 200,
                maximized: false,
            },
        }
        .sanitized();
        assert_eq!(prefs.zoom, MAX_ZOOM);
        assert_eq!(prefs.window.width, 1024);
        assert_eq!(prefs.window.height, 768);

        let prefs = Preferences {
            zoom: -5,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(prefs.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_merge_maximized_keeps_normal_size() {
        let mut prefs = Preferences::default();
        prefs.merge(&PreferencesChange::window(WindowGeometry {
            width: 1300,
            height: 850,
            maximized: false,
        }));
        prefs.merge(&PreferencesChange::window(WindowGeometry {
            width: 2560,
            height: 1440,
            maximized: true,
        }));
        assert_eq!(prefs.window.width, 1300);
        assert_eq!(prefs.window.height, 850);
        assert!(prefs.window.maximized);
    }

    #[test]
    fn test_merge_clamps_zoom() {
        let mut prefs = Preferences::default();
        prefs.merge(&PreferencesChange::zoom(20));
        assert_eq!(prefs.zoom, MIN_ZOOM);
    }
}
