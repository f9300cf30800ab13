use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::app::domain::settings::{Preferences, PreferencesChange, WindowGeometry};
use crate::app::infrastructure::io::PreferencesBackend;

pub const PREFERENCES_QUIET_PERIOD: Duration = Duration::from_millis(500);
pub const GEOMETRY_SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

/// In-memory preferences with a trailing-edge debounced flush.
pub struct PreferencesStore {
    current: Preferences,
    backend: Box<dyn PreferencesBackend>,
    quiet_period: Duration,
    flush_at: Option<Instant>,
}

impl PreferencesStore {
    /// Read stored preferences, falling back to defaults on any failure.
    pub fn load(backend: Box<dyn PreferencesBackend>) -> Self {
        let current = match backend.load() {
            Ok(prefs) => prefs.sanitized(),
            Err(e) => {
                debug!("using default preferences: {}", e);
                Preferences::default()
            }
        };
        Self {
            current,
            backend,
            quiet_period: PREFERENCES_QUIET_PERIOD,
            flush_at: None,
        }
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn current(&self) -> &Preferences {
        &self.current
    }

    /// Merge `change` now and push the flush out to `now + quiet_period`.
    pub fn stage(&mut self, change: PreferencesChange, now: Instant) {
        self.current.merge(&change);
        self.flush_at = Some(now + self.quiet_period);
    }

    /// Flush if the quiet period has elapsed. Returns true when a write was
    /// attempted.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.flush_at {
            Some(at) if at <= now => {
                self.flush_at = None;
                let snapshot = self.current;
                if let Err(e) = self.backend.persist(&snapshot) {
                    warn!("Failed to save preferences: {}", e);
                }
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.flush_at
    }

    pub fn has_pending_flush(&self) -> bool {
        self.flush_at.is_some()
    }
}

/// Rate-limits window geometry observations during a drag or resize.
///
/// The first observation in a quiet spell arms the sampler; at most one
/// geometry (the latest) is released per interval.
pub struct GeometrySampler {
    interval: Duration,
    latest: Option<WindowGeometry>,
    due: Option<Instant>,
}

impl GeometrySampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            latest: None,
            due: None,
        }
    }

    pub fn observe(&mut self, geometry: WindowGeometry, now: Instant) {
        self.latest = Some(geometry);
        if self.due.is_none() {
            self.due = Some(now + self.interval);
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<WindowGeometry> {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                self.latest.take()
            }
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.due
    }
}

impl Default for GeometrySampler {
    fn default() -> Self {
        Self::new(GEOMETRY_SAMPLE_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::settings::ThemeMode;
    use crate::app::infrastructure::io::memory::MemoryPreferences;

    fn store_with(backend: &MemoryPreferences) -> PreferencesStore {
        PreferencesStore::load(Box::new(backend.clone()))
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let backend = MemoryPreferences::new();
        let store = store_with(&backend);
        assert_eq!(store.current(), &Preferences::default());
        assert!(!store.has_pending_flush());
    }

    #[test]
    fn test_load_clamps_stored_zoom() {
        let backend = MemoryPreferences::with_stored(Preferences {
            zoom: 20,
            ..Default::default()
        });
        assert_eq!(store_with(&backend).current().zoom, 50);
    }

    #[test]
    fn test_stage_applies_immediately() {
        let backend = MemoryPreferences::new();
        let mut store = store_with(&backend);
        store.stage(PreferencesChange::theme(ThemeMode::Dark), Instant::now());
        assert_eq!(store.current().theme, ThemeMode::Dark);
        assert_eq!(backend.flush_count(), 0);
    }

    #[test]
    fn test_burst_of_changes_flushes_once_with_final_state() {
        let backend = MemoryPreferences::new();
        let mut store = store_with(&backend);
        let start = Instant::now();

        for (i, zoom) in [110, 120, 130, 140, 150].into_iter().enumerate() {
            let t = start + Duration::from_millis(100 * i as u64);
            store.stage(PreferencesChange::zoom(zoom), t);
            assert!(!store.poll(t));
        }

        let last = start + Duration::from_millis(400);
        assert!(!store.poll(last + Duration::from_millis(499)));
        assert!(store.poll(last + Duration::from_millis(500)));
        assert!(!store.poll(last + Duration::from_secs(10)));

        assert_eq!(backend.flush_count(), 1);
        assert_eq!(backend.last_flushed().unwrap().zoom, 150);
    }

    #[test]
    fn test_change_after_flush_starts_new_window() {
        let backend = MemoryPreferences::new();
        let mut store = store_with(&backend);
        let start = Instant::now();

        store.stage(PreferencesChange::zoom(120), start);
        store.poll(start + PREFERENCES_QUIET_PERIOD);
        store.stage(PreferencesChange::theme(ThemeMode::Dark), start + Duration::from_secs(1));
        assert_eq!(
            store.next_deadline(),
            Some(start + Duration::from_secs(1) + PREFERENCES_QUIET_PERIOD)
        );
        store.poll(start + Duration::from_secs(2));

        assert_eq!(backend.flush_count(), 2);
        let flushed = backend.last_flushed().unwrap();
        assert_eq!(flushed.zoom, 120);
        assert_eq!(flushed.theme, ThemeMode::Dark);
    }

    #[test]
    fn test_flush_failure_keeps_memory_state() {
        let backend = MemoryPreferences::new();
        backend.set_fail_writes(true);
        let mut store = store_with(&backend);
        let now = Instant::now();

        store.stage(PreferencesChange::zoom(200), now);
        assert!(store.poll(now + PREFERENCES_QUIET_PERIOD));
        assert_eq!(store.current().zoom, 200);
        assert_eq!(backend.flush_count(), 0);
        assert!(!store.has_pending_flush());
    }

    #[test]
    fn test_unmaximize_restores_previous_size() {
        let backend = MemoryPreferences::new();
        let mut store = store_with(&backend);
        let now = Instant::now();

        let normal = WindowGeometry {
            width: 1300,
            height: 850,
            maximized: false,
        };
        store.stage(PreferencesChange::window(normal), now);
        store.stage(
            PreferencesChange::window(WindowGeometry {
                width: 2560,
                height: 1400,
                maximized: true,
            }),
            now,
        );
        assert!(store.current().window.maximized);
        assert_eq!(store.current().window.width, 1300);
        assert_eq!(store.current().window.height, 850);
    }

    #[test]
    fn test_sampler_releases_latest_once_per_interval() {
        let mut sampler = GeometrySampler::default();
        let start = Instant::now();
        for px in 0..10u32 {
            sampler.observe(
                WindowGeometry {
                    width: 1000 + px,
                    height: 700,
                    maximized: false,
                },
                start + Duration::from_millis(px as u64 * 20),
            );
        }
        assert_eq!(sampler.poll(start + Duration::from_millis(249)), None);
        let sampled = sampler.poll(start + GEOMETRY_SAMPLE_INTERVAL).unwrap();
        assert_eq!(sampled.width, 1009);
        assert_eq!(sampler.poll(start + Duration::from_secs(5)), None);
        assert_eq!(sampler.next_deadline(), None);
    }
}
