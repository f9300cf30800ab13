//! MdReader: tabbed markdown reading with incremental rendering.

pub mod app;
pub mod ui;
