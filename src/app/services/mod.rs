//! Services layer - business operations and utilities.
//!
//! This module contains logic with no knowledge of the front end:
//! - Markdown conversion and rich-text export
//! - Pending file ingestion
//! - Incremental render scheduling
//! - Text operations

pub mod markdown;
pub mod pending;
pub mod render;
pub mod text_ops;
