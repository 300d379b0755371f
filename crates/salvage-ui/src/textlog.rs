//! The scrolling script log.
//!
//! A fixed ring of rows sized at startup from the framebuffer and font.
//! [`TextLog::push_str`] advances a write cursor through the ring; once
//! the ring is full the oldest row is recycled, so the screen always
//! shows the newest `rows` lines without any allocation per print.

use unicode_width::UnicodeWidthChar;

/// Upper bound on log rows regardless of panel height.
pub const MAX_LOG_ROWS: usize = 64;

/// Upper bound on log columns regardless of panel width.
pub const MAX_LOG_COLS: usize = 95;

/// Ring buffer of display rows with a write cursor.
#[derive(Debug, Clone)]
pub struct TextLog {
    rows: Vec<String>,
    cols: usize,
    row: usize,
    col: usize,
    top: usize,
}

impl TextLog {
    /// An empty log. Zero rows or columns yields a log that swallows
    /// everything, for panels too small to host text.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![String::new(); rows],
            cols,
            row: 0,
            col: 0,
            top: 0,
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Appends text, wrapping on newlines and on the column limit.
    /// Column accounting uses display width so wide glyphs wrap early
    /// rather than spill past the panel edge.
    pub fn push_str(&mut self, text: &str) {
        if self.rows.is_empty() || self.cols == 0 {
            return;
        }
        for ch in text.chars() {
            if ch == '\n' || self.col >= self.cols {
                self.advance_row();
            }
            if ch != '\n' {
                self.rows[self.row].push(ch);
                self.col += ch.width().unwrap_or(0);
            }
        }
    }

    fn advance_row(&mut self) {
        self.col = 0;
        self.row = (self.row + 1) % self.rows.len();
        self.rows[self.row].clear();
        if self.row == self.top {
            self.top = (self.top + 1) % self.rows.len();
        }
    }

    /// The row drawn at screen slot `slot`, following the ring rotation.
    #[must_use]
    pub fn visible_row(&self, slot: usize) -> &str {
        &self.rows[(slot + self.top) % self.rows.len()]
    }
}
