//! Progress bar state and the animation task.
//!
//! A bar runs in scopes: each [`ProgressState::show`] opens a segment
//! covering `portion` of the bar starting where the previous segment
//! ended, so a multi-phase job walks the bar left to right without the
//! phases knowing about each other. Within a segment the fraction moves
//! either by explicit reports or by wall clock against an expected
//! duration, and never backwards.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::compositor::Compositor;

/// Floor on the animator sleep regardless of the configured rate.
pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);

/// What the progress strip shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarMode {
    #[default]
    None,
    /// Filled left portion against an empty right portion.
    Normal,
    /// Looping spinner frames.
    Indeterminate,
}

/// Current bar mode, segment bounds, and fraction.
#[derive(Debug, Clone)]
pub struct ProgressState {
    pub mode: BarMode,
    scope_start: f32,
    scope_size: f32,
    started: Option<Instant>,
    duration_secs: u32,
    fraction: f32,
    /// Spinner frame index, advanced by the animation task.
    pub spinner_frame: usize,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            mode: BarMode::None,
            scope_start: 0.0,
            scope_size: 0.0,
            started: None,
            duration_secs: 0,
            fraction: 0.0,
            spinner_frame: 0,
        }
    }
}

impl ProgressState {
    /// Opens the next segment: `portion` of the full bar, optionally
    /// self-advancing over `seconds` of wall clock.
    pub fn show(&mut self, portion: f32, seconds: u32, now: Instant) {
        self.mode = BarMode::Normal;
        self.scope_start += self.scope_size;
        self.scope_size = portion;
        self.started = Some(now);
        self.duration_secs = seconds;
        self.fraction = 0.0;
    }

    /// Switches to the spinner. Returns true when the mode changed.
    pub fn show_indeterminate(&mut self) -> bool {
        if self.mode == BarMode::Indeterminate {
            return false;
        }
        self.mode = BarMode::Indeterminate;
        true
    }

    /// Explicit fraction report. Returns true when the bar would move by
    /// at least one pixel of `bar_width`; sub-pixel reports are dropped
    /// without updating so they can accumulate.
    pub fn set_fraction(&mut self, fraction: f32, bar_width: u32) -> bool {
        let fraction = fraction.clamp(0.0, 1.0);
        if self.mode != BarMode::Normal || fraction <= self.fraction {
            return false;
        }
        let scale = bar_width as f32 * self.scope_size;
        if (self.fraction * scale) as i32 == (fraction * scale) as i32 {
            return false;
        }
        self.fraction = fraction;
        true
    }

    /// Clears the bar and all segment accounting.
    pub fn reset(&mut self) {
        *self = ProgressState::default();
    }

    /// Advances a timed segment against the clock. Returns true when the
    /// fraction moved forward.
    pub fn tick_timed(&mut self, now: Instant) -> bool {
        if self.mode != BarMode::Normal || self.duration_secs == 0 {
            return false;
        }
        let Some(started) = self.started else {
            return false;
        };
        let elapsed = now.saturating_duration_since(started).as_secs_f32();
        let timed = (elapsed / self.duration_secs as f32).min(1.0);
        if timed > self.fraction {
            self.fraction = timed;
            true
        } else {
            false
        }
    }

    /// Steps the spinner. A zero frame count leaves it parked.
    pub fn advance_spinner(&mut self, frames: usize) {
        if frames > 0 {
            self.spinner_frame = (self.spinner_frame + 1) % frames;
        }
    }

    /// Position of the bar edge in `0.0..=1.0`, segment offset included.
    #[must_use]
    pub fn position(&self) -> f32 {
        self.scope_start + self.fraction * self.scope_size
    }

    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.fraction
    }
}

/// Spawns the frame clock that drives timed bars, the spinner, and the
/// installing overlay through [`Compositor::animate`].
pub fn spawn_progress_task(compositor: Arc<Compositor>) -> JoinHandle<()> {
    let interval = Duration::from_secs_f32(1.0 / compositor.update_fps().max(1) as f32);
    thread::Builder::new()
        .name("progress".into())
        .spawn(move || loop {
            let frame_start = Instant::now();
            compositor.animate(frame_start);
            let delay = interval
                .saturating_sub(frame_start.elapsed())
                .max(MIN_FRAME_DELAY);
            thread::sleep(delay);
        })
        .expect("spawn progress animator")
}
