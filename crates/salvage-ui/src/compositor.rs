//! The render lock and every display operation behind it.
//!
//! One mutex guards the renderer, the display state, and the assets
//! together. Every public operation is a full read-modify-draw-flip
//! sequence under that lock; the lock is coarse on purpose, because a
//! frame composed from half-updated state must never reach the panel.
//!
//! Progress updates take a shortcut: while the text overlay is hidden
//! and the last flip was a full page, only the strip is repainted. Any
//! full redraw invalidates the shortcut until the next full flip.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use salvage_render::{Renderer, Rgb};
use salvage_term::{Console, FeedEffects};
use tracing::{debug, trace};

use crate::assets::{Assets, UiParams};
use crate::battery::BatteryReadout;
use crate::draw::Frame;
use crate::progress::BarMode;
use crate::state::{BackgroundIcon, DisplayState, InputPrompt, ViewMode};
use crate::textlog::{MAX_LOG_COLS, MAX_LOG_ROWS};
use crate::theme::Theme;

/// Cursor phase length; feeds and scrolls restart it lit.
pub const CURSOR_BLINK_PERIOD: Duration = Duration::from_millis(500);

/// Console dimensions handed to the pty at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleGeometry {
    pub rows: u16,
    pub cols: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

struct Inner {
    renderer: Box<dyn Renderer>,
    state: DisplayState,
    assets: Assets,
    theme: Theme,
    params: UiParams,
    char_width: u32,
    char_height: u32,
    landscape: bool,
}

impl Inner {
    fn frame(&mut self) -> Frame<'_> {
        Frame {
            r: self.renderer.as_mut(),
            state: &self.state,
            assets: &self.assets,
            theme: &self.theme,
            char_w: self.char_width,
            char_h: self.char_height,
            landscape: self.landscape,
        }
    }

    /// Full redraw plus flip.
    fn update_screen(&mut self) {
        self.frame().draw_screen();
        self.state.pages_identical = false;
        self.renderer.flip();
    }

    /// Progress-only flip when the page still matches; full redraw
    /// otherwise.
    fn update_progress(&mut self) {
        if self.state.show_text || !self.state.pages_identical {
            self.frame().draw_screen();
            self.state.pages_identical = true;
        } else {
            self.frame().draw_progress();
        }
        self.renderer.flip();
    }
}

/// Owns the renderer and all display state.
pub struct Compositor {
    inner: Mutex<Inner>,
}

impl Compositor {
    /// Sizes the text panel from the framebuffer, the font, and the
    /// progress strip position, then loads the bitmap set.
    #[must_use]
    pub fn new(mut renderer: Box<dyn Renderer>, params: UiParams, theme: Theme, landscape: bool) -> Self {
        let assets = Assets::load(renderer.as_mut(), &params);
        let (char_width, char_height) = renderer.font_size();
        let (fb_w, fb_h) = renderer.size();
        let icon_h = assets.installing_height();
        let bar_h = assets.progress_size().map_or(0, |(_, h)| h);
        let bar_y = (3 * fb_h as i32 + icon_h as i32 - 2 * bar_h as i32) / 4;
        let text_rows = (bar_y / char_height.max(1) as i32 - 1).clamp(0, MAX_LOG_ROWS as i32) as usize;
        let text_cols = (fb_w / char_width.max(1)).min(MAX_LOG_COLS as u32) as usize;
        debug!(fb_w, fb_h, char_width, char_height, text_rows, text_cols, "compositor sized");
        Self {
            inner: Mutex::new(Inner {
                renderer,
                state: DisplayState::new(text_rows, text_cols),
                assets,
                theme,
                params,
                char_width,
                char_height,
                landscape,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.lock().theme
    }

    #[must_use]
    pub fn update_fps(&self) -> u32 {
        self.lock().params.update_fps
    }

    /// Width of the text panel in characters.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.lock().state.log.cols()
    }

    pub fn set_background(&self, icon: BackgroundIcon) {
        let mut inner = self.lock();
        inner.state.icon = icon;
        inner.update_screen();
    }

    pub fn show_text(&self, visible: bool) {
        let mut inner = self.lock();
        inner.state.show_text = visible;
        inner.update_screen();
    }

    #[must_use]
    pub fn text_visible(&self) -> bool {
        self.lock().state.show_text
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.lock().state.mode
    }

    /// Appends to the log and repaints. No-op on a panel too small for
    /// text.
    pub fn print(&self, text: &str) {
        trace!(text, "ui print");
        let mut inner = self.lock();
        if inner.state.log.rows() == 0 {
            return;
        }
        inner.state.log.push_str(text);
        inner.update_screen();
    }

    /// Opens a menu. Any running progress bar is cleared; menus and
    /// progress never share the screen.
    pub fn start_menu(&self, headers: &[String], items: &[String], title_rows: usize, start_sel: usize) {
        let mut inner = self.lock();
        inner.state.progress.reset();
        let (text_rows, text_cols) = (inner.state.log.rows(), inner.state.log.cols());
        if text_rows == 0 || text_cols == 0 {
            return;
        }
        inner
            .state
            .menu
            .start(headers, items, title_rows, start_sel, text_rows, text_cols);
        inner.update_screen();
    }

    /// Moves the highlight; repaints only on an actual change. Returns
    /// the clamped selection.
    pub fn menu_select(&self, sel: usize) -> usize {
        let mut inner = self.lock();
        let (sel, changed) = inner.state.menu.select(sel);
        if changed {
            inner.update_screen();
        }
        sel
    }

    pub fn end_menu(&self) {
        let mut inner = self.lock();
        if inner.state.menu.visible && inner.state.log.rows() > 0 {
            inner.state.menu.end();
            inner.update_screen();
        }
    }

    /// Stores a battery sample. Repaints only when the sample changed
    /// and a menu is up, since only the title row shows it.
    pub fn set_battery(&self, readout: BatteryReadout) {
        let mut inner = self.lock();
        if inner.state.battery == readout {
            return;
        }
        inner.state.battery = readout;
        if inner.state.menu.visible {
            inner.update_screen();
        }
    }

    /// Opens the next progress segment.
    pub fn show_progress(&self, portion: f32, seconds: u32) {
        let mut inner = self.lock();
        inner.state.progress.show(portion, seconds, Instant::now());
        inner.update_progress();
    }

    /// Explicit progress report; flips only on a visible change.
    pub fn set_progress(&self, fraction: f32) {
        let mut inner = self.lock();
        let bar_width = inner.assets.progress_size().map_or(0, |(w, _)| w);
        if inner.state.progress.set_fraction(fraction, bar_width) {
            inner.update_progress();
        }
    }

    pub fn show_indeterminate_progress(&self) {
        let mut inner = self.lock();
        if inner.state.progress.show_indeterminate() {
            inner.update_progress();
        }
    }

    pub fn reset_progress(&self) {
        let mut inner = self.lock();
        inner.state.progress.reset();
        inner.update_screen();
    }

    /// One animation clock tick: advances the installing overlay while
    /// the text overlay is hidden, steps the spinner, and moves timed
    /// bars. The overlay is staged without a flip and rides out on the
    /// next one, exactly like a progress-only update.
    pub fn animate(&self, now: Instant) {
        let mut inner = self.lock();
        let mut redraw = false;
        if inner.state.icon == BackgroundIcon::Installing
            && inner.params.installing_frames > 0
            && !inner.state.show_text
        {
            inner.state.installing_frame =
                (inner.state.installing_frame + 1) % inner.params.installing_frames;
            inner.frame().draw_overlay();
        }
        if inner.state.progress.mode == BarMode::Indeterminate {
            let frames = inner.params.indeterminate_frames;
            inner.state.progress.advance_spinner(frames);
            redraw = true;
        }
        if inner.state.progress.tick_timed(now) {
            redraw = true;
        }
        if redraw {
            inner.update_progress();
        }
    }

    /// Switches to console mode with a fresh scrollback. Returns the
    /// geometry for the pty: on landscape devices the framebuffer axes
    /// swap, because the keyboard side becomes the bottom.
    pub fn begin_console(&self) -> ConsoleGeometry {
        let mut inner = self.lock();
        let (fb_w, fb_h) = inner.renderer.size();
        let (width, height) = if inner.landscape { (fb_h, fb_w) } else { (fb_w, fb_h) };
        let rows = (height / inner.char_height.max(1)).max(1) as usize;
        let cols = (width / inner.char_width.max(1)).max(1) as usize;
        debug!(rows, cols, width, height, "console begin");
        inner.state.mode = ViewMode::Console;
        inner.state.console = Some(Console::new(rows, cols));
        inner.state.cursor_blink_at = Instant::now();
        inner.update_screen();
        ConsoleGeometry {
            rows: rows as u16,
            cols: cols as u16,
            pixel_width: width as u16,
            pixel_height: height as u16,
        }
    }

    /// Feeds shell output to the terminal and repaints. Feeding relights
    /// the cursor and restarts its blink clock.
    pub fn console_print(&self, bytes: &[u8]) -> FeedEffects {
        let mut inner = self.lock();
        let Some(console) = &mut inner.state.console else {
            return FeedEffects::default();
        };
        let effects = console.feed(bytes);
        inner.state.cursor_blink_at = Instant::now();
        inner.update_screen();
        effects
    }

    /// Sets the ink for subsequent console output. No repaint.
    pub fn console_set_front(&self, color: Rgb) {
        let mut inner = self.lock();
        if let Some(console) = &mut inner.state.console {
            console.set_front(color);
        }
    }

    pub fn console_scroll_up(&self, lines: usize) {
        self.console_scroll(|console| console.scroll_up(lines));
    }

    pub fn console_scroll_down(&self, lines: usize) {
        self.console_scroll(|console| console.scroll_down(lines));
    }

    fn console_scroll(&self, scroll: impl FnOnce(&mut Console)) {
        let mut inner = self.lock();
        let Some(console) = &mut inner.state.console else {
            return;
        };
        scroll(console);
        console.set_cursor_on(true);
        inner.state.cursor_blink_at = Instant::now();
        inner.update_screen();
    }

    /// Blink clock tick. Toggles and repaints once the phase elapsed.
    /// Returns false once the console is gone, ending the blink task.
    pub fn console_blink_tick(&self, now: Instant) -> bool {
        let mut inner = self.lock();
        if inner.state.mode != ViewMode::Console {
            return false;
        }
        if now.saturating_duration_since(inner.state.cursor_blink_at) >= CURSOR_BLINK_PERIOD {
            if let Some(console) = &mut inner.state.console {
                let lit = console.cursor_on();
                console.set_cursor_on(!lit);
            }
            inner.state.cursor_blink_at = now;
            inner.update_screen();
        }
        true
    }

    /// Leaves console mode and brings the error icon up behind the
    /// text overlay.
    pub fn end_console(&self) {
        let mut inner = self.lock();
        inner.state.mode = ViewMode::Normal;
        inner.state.icon = BackgroundIcon::Error;
        inner.update_screen();
        inner.state.console = None;
    }

    /// Runs a closure against the live terminal, for assertions and
    /// state inspection.
    pub fn with_console<R>(&self, f: impl FnOnce(&Console) -> R) -> Option<R> {
        let inner = self.lock();
        inner.state.console.as_ref().map(f)
    }

    pub fn begin_text_input(&self, header: &str) {
        let mut inner = self.lock();
        inner.state.input = Some(InputPrompt::new(header));
        inner.state.mode = ViewMode::TextInput;
        inner.update_screen();
    }

    /// Replaces the typed text and repaints, even when unchanged; the
    /// prompt blinks nothing, so the repaint is the user's echo.
    pub fn set_input_text(&self, typed: &str) {
        let mut inner = self.lock();
        if let Some(input) = &mut inner.state.input {
            input.typed = typed.to_owned();
        }
        inner.update_screen();
    }

    pub fn end_text_input(&self) {
        let mut inner = self.lock();
        inner.state.input = None;
        inner.state.mode = ViewMode::Normal;
        inner.update_screen();
    }
}
