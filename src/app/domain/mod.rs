//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Tab, TabId and partial tab updates
//! - User preferences (theme, zoom, window geometry)
//! - Message types for the event queue

pub mod document;
pub mod messages;
pub mod settings;

pub use document::{Tab, TabId, TabIdGenerator, TabUpdate};
pub use messages::Message;
pub use settings::{Preferences, PreferencesChange, ThemeMode, WindowGeometry};
