//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Tab, Preferences, Messages)
//! - `controllers/` - Orchestration (SessionManager, PreviewController, PreferencesStore)
//! - `services/` - Business operations (render scheduling, pending files, markdown, text_ops)
//! - `infrastructure/` - External integrations (file/clipboard I/O, shell menu, single instance, error)
//! - `state.rs` - Main application coordinator

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::preferences::{GeometrySampler, PreferencesStore};
pub use controllers::preview::PreviewController;
pub use controllers::tabs::{CloseOutcome, SaveOutcome, SessionManager};
pub use domain::{Message, Preferences, PreferencesChange, Tab, TabId, TabUpdate, ThemeMode, WindowGeometry};
pub use infrastructure::error::{AppError, Result};
pub use services::pending::PendingFileQueue;
pub use services::render::{RenderConfig, RenderScheduler, RenderStatus};
pub use state::{AppState, Services};
