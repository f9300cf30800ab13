use std::collections::HashMap;
use std::time::Instant;

use log::debug;

use crate::app::domain::document::TabId;
use crate::app::services::markdown::convert_to_presentation;
use crate::app::services::render::{RenderConfig, RenderScheduler, RenderStatus};
use crate::app::services::text_ops::char_boundary;

/// Per-tab incremental render state.
///
/// Schedulers are created on the first content reset for a tab and dropped
/// when the tab closes. The owner decides visibility (active tab, preview
/// mode) and reports every transition explicitly.
pub struct PreviewController {
    config: RenderConfig,
    schedulers: HashMap<TabId, RenderScheduler>,
}

impl PreviewController {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            schedulers: HashMap::new(),
        }
    }

    /// Content identity changed (load or replace): restart from the first chunk.
    pub fn content_reset(&mut self, id: TabId, len_chars: usize, visible: bool, now: Instant) {
        let config = self.config;
        self.schedulers
            .entry(id)
            .or_insert_with(|| RenderScheduler::new(config))
            .reset(len_chars, visible, now);
    }

    pub fn set_visible(&mut self, id: TabId, visible: bool, now: Instant) {
        if let Some(sched) = self.schedulers.get_mut(&id) {
            sched.set_visible(visible, now);
        }
    }

    pub fn remove(&mut self, id: TabId) {
        if self.schedulers.remove(&id).is_some() {
            debug!("render state dropped for tab {}", id);
        }
    }

    /// Fire due chunk timers. Returns the tabs whose reveal advanced.
    pub fn poll(&mut self, now: Instant) -> Vec<TabId> {
        let mut advanced: Vec<TabId> = self
            .schedulers
            .iter_mut()
            .filter_map(|(id, sched)| sched.poll(now).then_some(*id))
            .collect();
        advanced.sort();
        advanced
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.schedulers
            .values()
            .filter_map(RenderScheduler::next_deadline)
            .min()
    }

    pub fn scheduler(&self, id: TabId) -> Option<&RenderScheduler> {
        self.schedulers.get(&id)
    }

    /// The part of `content` currently eligible for rendering. A tab without
    /// render state shows everything.
    pub fn visible_prefix<'a>(&self, id: TabId, content: &'a str) -> &'a str {
        match self.schedulers.get(&id) {
            Some(sched) => &content[..char_boundary(content, sched.revealed_len())],
            None => content,
        }
    }

    pub fn render(&self, id: TabId, content: &str) -> String {
        convert_to_presentation(self.visible_prefix(id, content))
    }

    /// Status line text for a long document still being revealed.
    pub fn progress_label(&self, id: TabId) -> Option<String> {
        let sched = self.schedulers.get(&id)?;
        if sched.total_len() <= self.config.initial_chunk {
            return None;
        }
        match sched.status() {
            RenderStatus::Running => Some(format!(
                "Optimizing render... {}%",
                sched.progress_percent()
            )),
            RenderStatus::Paused => {
                Some("Long document: loading resumes when this tab is shown".to_string())
            }
            RenderStatus::Idle | RenderStatus::Complete => None,
        }
    }
}

impl Default for PreviewController {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> RenderConfig {
        RenderConfig {
            initial_chunk: 4,
            increment: 4,
            interval: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_visible_prefix_respects_char_boundaries() {
        let now = Instant::now();
        let mut preview = PreviewController::new(config());
        let content = "héllo wörld";
        preview.content_reset(TabId(1), content.chars().count(), true, now);
        assert_eq!(preview.visible_prefix(TabId(1), content), "héll");

        preview.poll(now + Duration::from_millis(10));
        assert_eq!(preview.visible_prefix(TabId(1), content), "héllo wö");
    }

    #[test]
    fn test_unknown_tab_shows_everything() {
        let preview = PreviewController::new(config());
        assert_eq!(preview.visible_prefix(TabId(9), "abc"), "abc");
        assert!(preview.progress_label(TabId(9)).is_none());
    }

    #[test]
    fn test_schedulers_are_independent() {
        let now = Instant::now();
        let mut preview = PreviewController::new(config());
        preview.content_reset(TabId(1), 20, true, now);
        preview.content_reset(TabId(2), 20, false, now);

        let advanced = preview.poll(now + Duration::from_millis(10));
        assert_eq!(advanced, vec![TabId(1)]);
        assert_eq!(preview.scheduler(TabId(1)).unwrap().revealed_len(), 8);
        assert_eq!(preview.scheduler(TabId(2)).unwrap().revealed_len(), 4);
    }

    #[test]
    fn test_next_deadline_is_earliest_running() {
        let now = Instant::now();
        let mut preview = PreviewController::new(config());
        assert_eq!(preview.next_deadline(), None);

        preview.content_reset(TabId(1), 20, true, now);
        preview.content_reset(TabId(2), 20, true, now + Duration::from_millis(3));
        assert_eq!(preview.next_deadline(), Some(now + Duration::from_millis(10)));

        preview.set_visible(TabId(1), false, now);
        assert_eq!(preview.next_deadline(), Some(now + Duration::from_millis(13)));

        preview.remove(TabId(2));
        assert_eq!(preview.next_deadline(), None);
    }

    #[test]
    fn test_progress_label() {
        let now = Instant::now();
        let mut preview = PreviewController::new(config());
        preview.content_reset(TabId(1), 16, true, now);
        assert_eq!(
            preview.progress_label(TabId(1)).as_deref(),
            Some("Optimizing render... 25%")
        );

        preview.set_visible(TabId(1), false, now);
        assert!(preview.progress_label(TabId(1)).unwrap().starts_with("Long document"));

        preview.content_reset(TabId(2), 3, true, now);
        assert!(preview.progress_label(TabId(2)).is_none());
    }

    #[test]
    fn test_render_uses_revealed_prefix() {
        let now = Instant::now();
        let mut preview = PreviewController::new(config());
        let content = "# Heading\n\nBody";
        preview.content_reset(TabId(1), content.chars().count(), true, now);
        let html = preview.render(TabId(1), content);
        assert!(html.contains("<h1>He</h1>"));
    }
}
