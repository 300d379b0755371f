//! The scrollback matrix.
//!
//! A fixed block of 1024 rows in a flat row-major vector. The console
//! never reallocates: when the cursor runs off the end, [`Grid::compact`]
//! drops the oldest 64 rows, slides everything up, and blanks the tail.

use crate::cell::Cell;

/// Total rows kept, visible screen plus scrollback.
pub const TOTAL_ROWS: usize = 1024;

/// Rows discarded in one compaction.
pub const SHIFT_ROWS: usize = 64;

/// Row-major cell matrix with a fixed row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
    cols: usize,
}

impl Grid {
    /// A fully blank grid `cols` cells wide.
    #[must_use]
    pub fn new(cols: usize) -> Self {
        let cols = cols.max(1);
        Self {
            cells: vec![Cell::BLANK; cols * TOTAL_ROWS],
            cols,
        }
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < TOTAL_ROWS && col < self.cols);
        row * self.cols + col
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[self.index(row, col)]
    }

    /// All cells of one row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[Cell] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        let i = self.index(row, col);
        self.cells[i] = cell;
    }

    /// Overwrites just the character, keeping whatever ink the cell had.
    /// Tab fills use this; they pad with spaces without recoloring.
    pub fn set_char(&mut self, row: usize, col: usize, ch: char) {
        let i = self.index(row, col);
        self.cells[i].ch = ch;
    }

    /// Blanks `cols` within one row back to spaces with black ink.
    pub fn clear_span(&mut self, row: usize, cols: std::ops::Range<usize>) {
        let base = row * self.cols;
        for cell in &mut self.cells[base + cols.start..base + cols.end] {
            *cell = Cell::BLANK;
        }
    }

    pub fn clear_row(&mut self, row: usize) {
        self.clear_span(row, 0..self.cols);
    }

    /// Slides rows up by [`SHIFT_ROWS`] and blanks the freed tail.
    pub fn compact(&mut self) {
        let shift = SHIFT_ROWS * self.cols;
        let len = self.cells.len();
        self.cells.copy_within(shift.., 0);
        for cell in &mut self.cells[len - shift..] {
            *cell = Cell::BLANK;
        }
    }
}
