//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! domain models, services, and the front end:
//! - Session (tab) management
//! - Incremental markdown preview
//! - Debounced preferences and window geometry sampling

pub mod preferences;
pub mod preview;
pub mod tabs;
