//! Incremental reveal of a long document to the markdown renderer.
//!
//! Feeding a large document to the converter in one go stalls layout, so the
//! preview starts with an initial chunk and grows by a fixed increment on a
//! timer. The timer only runs while the owning tab is visible.
//!
//! States:
//!
//! ```text
//! Idle ──reset──▶ Running ◀──show── Paused
//!                   │  └────hide─────▶ │
//!                   └─reveal ≥ total─▶ Complete
//! ```
//!
//! `Complete` is terminal until the next `reset`. Lengths are in characters.

use std::time::{Duration, Instant};

use log::debug;

pub const INITIAL_CHUNK_SIZE: usize = 3000;
pub const INCREMENTAL_CHUNK_SIZE: usize = 3000;
pub const RENDER_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub initial_chunk: usize,
    pub increment: usize,
    pub interval: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            initial_chunk: INITIAL_CHUNK_SIZE,
            increment: INCREMENTAL_CHUNK_SIZE,
            interval: RENDER_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Idle,
    Running,
    Paused,
    Complete,
}

#[derive(Debug, Clone)]
pub struct RenderScheduler {
    config: RenderConfig,
    total_len: usize,
    revealed: usize,
    status: RenderStatus,
    /// Next reveal step; `Some` only while `Running`.
    deadline: Option<Instant>,
}

impl RenderScheduler {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            total_len: 0,
            revealed: 0,
            status: RenderStatus::Idle,
            deadline: None,
        }
    }

    pub fn status(&self) -> RenderStatus {
        self.status
    }

    pub fn revealed_len(&self) -> usize {
        self.revealed
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// New content identity: start over from the initial chunk.
    ///
    /// Cancels any in-flight step before scheduling the next one.
    pub fn reset(&mut self, total_len: usize, visible: bool, now: Instant) {
        self.deadline = None;
        self.total_len = total_len;
        self.revealed = self.config.initial_chunk.min(total_len);
        if self.revealed >= total_len {
            self.status = RenderStatus::Complete;
        } else if visible {
            self.status = RenderStatus::Running;
            self.deadline = Some(now + self.config.interval);
        } else {
            self.status = RenderStatus::Paused;
        }
        debug!(
            "render reset: {}/{} chars, {:?}",
            self.revealed, self.total_len, self.status
        );
    }

    /// Visibility of the owning tab changed. Never touches `revealed`.
    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        match (self.status, visible) {
            (RenderStatus::Running, false) => {
                self.deadline = None;
                self.status = RenderStatus::Paused;
            }
            (RenderStatus::Paused, true) if self.revealed < self.total_len => {
                self.status = RenderStatus::Running;
                self.deadline = Some(now + self.config.interval);
            }
            _ => {}
        }
    }

    /// Reveal one more increment. No-op unless `Running`.
    pub fn step(&mut self) -> bool {
        if self.status != RenderStatus::Running {
            return false;
        }
        let next = self.revealed.saturating_add(self.config.increment);
        if next >= self.total_len {
            self.revealed = self.total_len;
            self.status = RenderStatus::Complete;
            self.deadline = None;
        } else {
            self.revealed = next;
        }
        true
    }

    /// Fire the chunk timer if it is due. Returns true if the reveal advanced.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                let advanced = self.step();
                if self.status == RenderStatus::Running {
                    self.deadline = Some(now + self.config.interval);
                }
                advanced
            }
            _ => false,
        }
    }

    /// Revealed share in percent, for the progress indicator.
    pub fn progress_percent(&self) -> u8 {
        if self.total_len == 0 {
            return 100;
        }
        ((self.revealed as u128 * 100 + self.total_len as u128 / 2) / self.total_len as u128).min(100)
            as u8
    }

    /// Whether a progress indicator should be shown at all.
    pub fn shows_indicator(&self) -> bool {
        matches!(self.status, RenderStatus::Running | RenderStatus::Paused)
    }
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}
