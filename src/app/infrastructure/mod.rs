//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains code that interfaces with external systems:
//! - Document, preferences and clipboard collaborators (`io`)
//! - Context menu registration (`platform`)
//! - Single-instance forwarding (`instance`)
//! - Error types

pub mod error;
pub mod instance;
pub mod io;
pub mod platform;
