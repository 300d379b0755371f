//! Shared display state.
//!
//! Everything the draw path reads lives here, behind the compositor's
//! single lock. Background tasks and interactive loops mutate this
//! state through compositor operations only, so a frame is always
//! composed from one consistent snapshot.

use std::time::Instant;

use salvage_term::Console;

use crate::battery::BatteryReadout;
use crate::menu::MenuDisplay;
use crate::progress::ProgressState;
use crate::textlog::TextLog;

/// Longest accepted line in the text-input modal, and the width of its
/// underscore field.
pub const USER_INPUT_TEXT_MAX: usize = 32;

/// Which surface owns the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Icon, progress strip, and the text overlay.
    #[default]
    Normal,
    /// Full-screen terminal.
    Console,
    /// Normal background dimmed under the input box.
    TextInput,
}

/// Icon centered behind the normal view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundIcon {
    #[default]
    None,
    Installing,
    Error,
}

/// The text-input modal's header and what was typed so far.
#[derive(Debug, Clone, Default)]
pub struct InputPrompt {
    pub header: String,
    pub typed: String,
}

impl InputPrompt {
    /// Header text is cut to the field width up front.
    #[must_use]
    pub fn new(header: &str) -> Self {
        Self {
            header: header.chars().take(USER_INPUT_TEXT_MAX).collect(),
            typed: String::new(),
        }
    }

    /// The field as drawn: typed text padded with underscores out to
    /// the full input width.
    #[must_use]
    pub fn display_line(&self) -> String {
        format!("{:_<width$}", self.typed, width = USER_INPUT_TEXT_MAX)
    }
}

/// One consistent snapshot of everything on screen.
#[derive(Debug)]
pub struct DisplayState {
    pub mode: ViewMode,
    pub icon: BackgroundIcon,
    /// Text overlay toggle; starts on so early prints are visible.
    pub show_text: bool,
    /// Whether the composed page still matches what a progress-only
    /// draw left behind. Cleared by any full redraw.
    pub pages_identical: bool,
    /// Installing overlay animation frame.
    pub installing_frame: usize,
    pub battery: BatteryReadout,
    pub menu: MenuDisplay,
    pub log: TextLog,
    pub progress: ProgressState,
    /// Present only in console mode.
    pub console: Option<Console>,
    /// Last cursor activity; the blink clock measures from here.
    pub cursor_blink_at: Instant,
    /// Present only in text-input mode.
    pub input: Option<InputPrompt>,
}

impl DisplayState {
    #[must_use]
    pub fn new(text_rows: usize, text_cols: usize) -> Self {
        Self {
            mode: ViewMode::default(),
            icon: BackgroundIcon::default(),
            show_text: true,
            pages_identical: false,
            installing_frame: 0,
            battery: BatteryReadout::default(),
            menu: MenuDisplay::default(),
            log: TextLog::new(text_rows, text_cols),
            progress: ProgressState::default(),
            console: None,
            cursor_blink_at: Instant::now(),
            input: None,
        }
    }
}
