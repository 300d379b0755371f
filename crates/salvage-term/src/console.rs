//! The console state machine.
//!
//! [`Console::feed`] consumes one chunk of shell output: plain bytes
//! become cells, control bytes move the cursor, and escape sequences are
//! routed through the [`EscapeParser`]. After the whole chunk is applied
//! the view folds forward so the cursor line is on screen, which is what
//! makes fresh output chase the bottom like a real terminal.
//!
//! Two bookkeeping values drive the folding. `forced_top` is the row the
//! visible window is pinned to; `reserve` counts how far the cursor has
//! pushed past the window's bottom edge since the last fold. The
//! relation `reserve == 1 - (forced_top + rows - cur_row)` holds between
//! chunks; cursor escapes re-derive it, and the end-of-chunk fold moves
//! `forced_top` down by any positive reserve.

use salvage_render::Rgb;
use tracing::trace;

use crate::cell::Cell;
use crate::grid::{Grid, SHIFT_ROWS, TOTAL_ROWS};
use crate::palette::{self, DEFAULT_FRONT};
use crate::parser::{EscapeParser, Sequence};

const ESC: u8 = 0x1b;
const BELL: u8 = 0x07;
const BACKSPACE: u8 = 0x08;

/// Tab stops land on multiples of five columns.
const TAB_STOP: usize = 5;

/// Side effects of one feed that the caller acts on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedEffects {
    /// BEL bytes seen. The UI blinks the notification LED once per bell,
    /// there being no speaker to ring.
    pub bells: u32,
}

/// Scrollback console with a screen-sized view window.
#[derive(Debug, Clone, PartialEq)]
pub struct Console {
    grid: Grid,
    rows: usize,
    cols: usize,
    cur_row: usize,
    cur_col: usize,
    top_row: usize,
    forced_top: usize,
    reserve: i32,
    current: Rgb,
    parser: EscapeParser,
    cursor_on: bool,
}

impl Console {
    /// A blank console with a `rows` by `cols` view window.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.clamp(1, TOTAL_ROWS);
        let cols = cols.max(1);
        Self {
            grid: Grid::new(cols),
            rows,
            cols,
            cur_row: 0,
            cur_col: 0,
            top_row: 0,
            forced_top: 0,
            reserve: 1 - rows as i32,
            current: DEFAULT_FRONT,
            parser: EscapeParser::new(),
            cursor_on: true,
        }
    }

    /// Applies one chunk of output, then folds the view toward the
    /// cursor and re-lights it so it never blinks off mid-burst.
    pub fn feed(&mut self, bytes: &[u8]) -> FeedEffects {
        let mut effects = FeedEffects::default();
        for &byte in bytes {
            if byte == ESC {
                self.parser.begin();
                continue;
            }
            if self.parser.active() {
                if let Some(seq) = self.parser.push(byte) {
                    self.apply_sequence(&seq, &mut effects);
                }
            } else {
                self.put_char(byte, &mut effects);
            }
        }

        if self.reserve > 0 {
            self.forced_top = (self.forced_top + self.reserve as usize)
                .min(TOTAL_ROWS - self.rows);
            self.reserve = 0;
        }
        self.top_row = self.forced_top;
        self.cursor_on = true;
        effects
    }

    fn put_char(&mut self, byte: u8, effects: &mut FeedEffects) {
        match byte {
            b'\n' => {
                self.cur_row += 1;
                self.reserve += 1;
            }
            b'\r' => self.cur_col = 0,
            b'\t' => {
                let end = self.cur_col + (TAB_STOP - self.cur_col % TAB_STOP);
                if end >= self.cols - 1 {
                    for col in self.cur_col..self.cols {
                        self.grid.set_char(self.cur_row, col, ' ');
                    }
                    self.cur_col = 0;
                    self.cur_row += 1;
                    self.reserve += 1;
                } else {
                    for col in self.cur_col..end {
                        self.grid.set_char(self.cur_row, col, ' ');
                    }
                    self.cur_col = end;
                }
            }
            BACKSPACE => {
                if self.cur_col == 0 {
                    if self.cur_row > 0 {
                        self.cur_col = self.cols - 1;
                        self.cur_row -= 1;
                    }
                } else {
                    self.cur_col -= 1;
                }
            }
            BELL => effects.bells += 1,
            _ => {
                self.grid
                    .set(self.cur_row, self.cur_col, Cell::new(byte as char, self.current));
                self.cur_col += 1;
                if self.cur_col > self.cols - 1 {
                    self.cur_col = 0;
                    self.cur_row += 1;
                    self.reserve += 1;
                }
            }
        }

        if self.cur_row == TOTAL_ROWS {
            self.grid.compact();
            self.cur_row -= SHIFT_ROWS;
            self.forced_top = self.forced_top.saturating_sub(SHIFT_ROWS);
        }
    }

    fn apply_sequence(&mut self, seq: &Sequence, effects: &mut FeedEffects) {
        trace!(sequence = %String::from_utf8_lossy(&seq.bytes), "escape sequence");
        let class = seq.classify();
        let mut handled = false;

        if class.is_csi() {
            match class.terminator {
                // Cursor up, pinned to the forced window top.
                Some(b'A') => {
                    let target =
                        (self.cur_row as i64 - i64::from(class.param(0))).max(self.forced_top as i64);
                    self.cur_row = target as usize;
                    self.update_reserve_from(self.forced_top);
                    handled = true;
                }
                // Cursor down, stopping on the window's bottom row.
                Some(b'B') => {
                    let limit = (self.forced_top + self.rows - 1) as i64;
                    let target = (self.cur_row as i64 + i64::from(class.param(0))).min(limit);
                    self.cur_row = target as usize;
                    self.update_reserve_from(self.forced_top);
                    handled = true;
                }
                Some(b'C') => {
                    self.cur_col =
                        (self.cur_col + class.param(0) as usize).min(self.cols - 1);
                    handled = true;
                }
                Some(b'D') => {
                    self.cur_col = self.cur_col.saturating_sub(class.param(0) as usize);
                    handled = true;
                }
                // Home with offsets. Pins the window to the current view
                // top so later output cannot scroll it away.
                Some(b'H') => {
                    let p0 = (class.param(0) as usize).min(self.rows - 1);
                    let p1 = (class.param(1) as usize).min(self.cols - 1);
                    self.cur_row = self.top_row + p0;
                    self.cur_col = p1;
                    self.forced_top = self.top_row;
                    self.update_reserve_from(self.top_row);
                    handled = true;
                }
                // Erase from the cursor to the end of the scrollback.
                Some(b'J') => {
                    self.grid.clear_span(self.cur_row, self.cur_col..self.cols);
                    for row in self.cur_row + 1..TOTAL_ROWS {
                        self.grid.clear_row(row);
                    }
                    handled = true;
                }
                Some(b'K') => {
                    match class.param(0) {
                        0 => self.grid.clear_span(self.cur_row, self.cur_col..self.cols),
                        1 => self.grid.clear_span(self.cur_row, 0..self.cur_col + 1),
                        2 => self.grid.clear_row(self.cur_row),
                        _ => {}
                    }
                    handled = true;
                }
                // Foreground color only. Attribute and background
                // parameters pass through without effect.
                Some(b'm') => {
                    for &param in class.params() {
                        match param {
                            0 | 39 => self.current = DEFAULT_FRONT,
                            _ => {
                                if let Some(color) = palette::indexed(param) {
                                    self.current = color;
                                }
                            }
                        }
                    }
                    handled = true;
                }
                _ => {}
            }
        }

        if !handled {
            // Unrecognized sequences stay visible: a caret, then the
            // sequence body verbatim.
            self.put_char(b'^', effects);
            for &byte in &seq.bytes {
                self.put_char(byte, effects);
            }
        }
    }

    fn update_reserve_from(&mut self, base: usize) {
        self.reserve =
            (1 - (base as i64 + self.rows as i64 - self.cur_row as i64)) as i32;
    }

    /// Scrolls the view toward older rows.
    pub fn scroll_up(&mut self, count: usize) {
        self.top_row = self.top_row.saturating_sub(count);
    }

    /// Scrolls the view toward the cursor, never past it and never above
    /// the pinned top.
    pub fn scroll_down(&mut self, count: usize) {
        let max_top = (self.cur_row + 1)
            .saturating_sub(self.rows)
            .max(self.forced_top);
        self.top_row = (self.top_row + count).min(max_top);
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cursor position as `(row, col)` in grid coordinates.
    #[must_use]
    pub fn cursor(&self) -> (usize, usize) {
        (self.cur_row, self.cur_col)
    }

    /// First grid row currently on screen.
    #[must_use]
    pub fn top_row(&self) -> usize {
        self.top_row
    }

    #[must_use]
    pub fn cursor_on(&self) -> bool {
        self.cursor_on
    }

    /// Blink control; [`Console::feed`] forces the cursor back on.
    pub fn set_cursor_on(&mut self, on: bool) {
        self.cursor_on = on;
    }

    #[must_use]
    pub fn front(&self) -> Rgb {
        self.current
    }

    /// Overrides the ink for subsequent prints. The session uses this to
    /// paint its header before handing the color back to the shell.
    pub fn set_front(&mut self, color: Rgb) {
        self.current = color;
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn row_text(console: &Console, row: usize) -> String {
        let text: String = console.grid().row(row).iter().map(|c| c.ch).collect();
        text.trim_end().to_string()
    }

    #[test]
    fn printing_advances_the_cursor_and_wraps() {
        let mut console = Console::new(3, 4);
        console.feed(b"abcde");
        assert_eq!(row_text(&console, 0), "abcd");
        assert_eq!(row_text(&console, 1), "e");
        assert_eq!(console.cursor(), (1, 1));
    }

    #[test]
    fn carriage_return_overprints_the_line() {
        let mut console = Console::new(3, 8);
        console.feed(b"abc\rX");
        assert_eq!(row_text(&console, 0), "Xbc");
        assert_eq!(console.cursor(), (0, 1));
    }

    #[test]
    fn line_feed_keeps_the_column() {
        let mut console = Console::new(4, 8);
        console.feed(b"ab\ncd");
        assert_eq!(row_text(&console, 0), "ab");
        assert_eq!(row_text(&console, 1), "  cd");
        assert_eq!(console.cursor(), (1, 4));
    }

    #[test]
    fn tab_aligns_to_five_column_stops() {
        let mut console = Console::new(3, 20);
        console.feed(b"a\tb\tc");
        assert_eq!(row_text(&console, 0), "a    b    c");
        assert_eq!(console.cursor(), (0, 11));
    }

    #[test]
    fn tab_at_the_edge_pads_and_wraps() {
        let mut console = Console::new(3, 6);
        console.feed(b"abcd\tX");
        assert_eq!(row_text(&console, 0), "abcd");
        assert_eq!(console.grid().cell(0, 4).ch, ' ');
        assert_eq!(console.grid().cell(0, 5).ch, ' ');
        assert_eq!(console.grid().cell(1, 0).ch, 'X');
    }

    #[test]
    fn backspace_steps_back_across_the_wrap() {
        let mut console = Console::new(3, 4);
        console.feed(b"abcd");
        assert_eq!(console.cursor(), (1, 0));
        console.feed(b"\x08");
        assert_eq!(console.cursor(), (0, 3));
    }

    #[test]
    fn backspace_at_the_origin_stays_put() {
        let mut console = Console::new(3, 4);
        console.feed(b"\x08");
        assert_eq!(console.cursor(), (0, 0));
    }

    #[test]
    fn bells_count_without_printing() {
        let mut console = Console::new(3, 8);
        let effects = console.feed(b"a\x07\x07b");
        assert_eq!(effects.bells, 2);
        assert_eq!(row_text(&console, 0), "ab");
    }

    #[test]
    fn cursor_up_clamps_to_the_window_top() {
        let mut console = Console::new(3, 8);
        console.feed(b"one\r\ntwo\r\nthree");
        assert_eq!(console.cursor().0, 2);
        console.feed(b"\x1b[9A");
        assert_eq!(console.cursor().0, 0);
    }

    #[test]
    fn cursor_down_clamps_to_the_window_bottom() {
        let mut console = Console::new(3, 8);
        console.feed(b"x");
        console.feed(b"\x1b[9B");
        assert_eq!(console.cursor().0, 2);
    }

    #[test]
    fn cursor_right_and_left_stay_in_the_line() {
        let mut console = Console::new(3, 6);
        console.feed(b"\x1b[99C");
        assert_eq!(console.cursor(), (0, 5));
        console.feed(b"\x1b[2D");
        assert_eq!(console.cursor(), (0, 3));
        console.feed(b"\x1b[99D");
        assert_eq!(console.cursor(), (0, 0));
    }

    #[test]
    fn home_pins_the_view_for_later_output() {
        let mut console = Console::new(3, 8);
        console.feed(b"1\r\n2\r\n3\r\n4\r\n");
        assert_eq!(console.top_row(), 2);

        console.feed(b"\x1b[H");
        assert_eq!(console.cursor(), (2, 0));

        // Two more lines fit inside the pinned window.
        console.feed(b"a\r\nb\r\n");
        assert_eq!(console.top_row(), 2);
        // The third pushes the window down again.
        console.feed(b"c\r\n");
        assert_eq!(console.top_row(), 3);
    }

    #[test]
    fn home_takes_row_and_column_offsets() {
        let mut console = Console::new(4, 10);
        console.feed(b"\x1b[2;5H");
        assert_eq!(console.cursor(), (2, 5));
        console.feed(b"\x1b[9;99H");
        assert_eq!(console.cursor(), (3, 9));
    }

    #[test]
    fn erase_below_clears_to_the_end_of_the_scrollback() {
        let mut console = Console::new(3, 8);
        console.feed(b"aaaa\r\nbbbb\r\ncccc");
        console.feed(b"\x1b[H\x1b[2C\x1b[J");
        assert_eq!(row_text(&console, 0), "aa");
        assert_eq!(row_text(&console, 1), "");
        assert_eq!(row_text(&console, 2), "");
    }

    #[test]
    fn erase_line_variants_share_the_cursor_column() {
        let mut console = Console::new(3, 8);
        console.feed(b"abcdef\r\x1b[3C");

        let mut from_cursor = console.clone();
        from_cursor.feed(b"\x1b[K");
        assert_eq!(row_text(&from_cursor, 0), "abc");

        let mut to_cursor = console.clone();
        to_cursor.feed(b"\x1b[1K");
        assert_eq!(to_cursor.grid().cell(0, 3).ch, ' ');
        assert_eq!(to_cursor.grid().cell(0, 4).ch, 'e');

        let mut whole = console.clone();
        whole.feed(b"\x1b[2K");
        assert_eq!(row_text(&whole, 0), "");
    }

    #[test]
    fn color_sequences_pick_palette_inks() {
        let mut console = Console::new(3, 16);
        console.feed(b"\x1b[31mr\x1b[97mw\x1b[0md");
        assert_eq!(console.grid().cell(0, 0).fg, Rgb::new(205, 0, 0));
        assert_eq!(console.grid().cell(0, 1).fg, Rgb::new(255, 255, 255));
        assert_eq!(console.grid().cell(0, 2).fg, DEFAULT_FRONT);
    }

    #[test]
    fn both_palette_ends_are_reachable() {
        let mut console = Console::new(3, 8);
        console.feed(b"\x1b[37ma");
        assert_eq!(console.grid().cell(0, 0).fg, Rgb::new(229, 229, 229));
        console.feed(b"\x1b[30mb");
        assert_eq!(console.grid().cell(0, 1).fg, Rgb::new(0, 0, 0));
    }

    #[test]
    fn sgr_parameters_apply_left_to_right() {
        let mut console = Console::new(3, 8);
        console.feed(b"\x1b[31;1;32mx");
        assert_eq!(console.grid().cell(0, 0).fg, Rgb::new(0, 205, 0));
    }

    #[test]
    fn unknown_sequences_echo_with_a_caret() {
        let mut console = Console::new(3, 16);
        console.feed(b"\x1b[5Z");
        assert_eq!(row_text(&console, 0), "^[5Z");
    }

    #[test]
    fn non_square_bracket_shapes_echo_too() {
        let mut console = Console::new(3, 16);
        console.feed(b"\x1b(B");
        assert_eq!(row_text(&console, 0), "^(B");
    }

    #[test]
    fn sequences_span_feed_chunks() {
        let mut console = Console::new(3, 8);
        console.feed(b"\x1b[3");
        console.feed(b"1mx");
        assert_eq!(console.grid().cell(0, 0).fg, Rgb::new(205, 0, 0));
    }

    #[test]
    fn a_second_escape_restarts_the_sequence() {
        let mut console = Console::new(3, 8);
        console.feed(b"\x1b[3\x1b[32mx");
        assert_eq!(console.grid().cell(0, 0).fg, Rgb::new(0, 205, 0));
    }

    #[test]
    fn the_view_folds_to_the_cursor_after_each_chunk() {
        let mut console = Console::new(3, 8);
        for line in [b"one\r\n", b"two\r\n", b"thr\r\n", b"fou\r\n"] {
            console.feed(line);
        }
        assert_eq!(console.cursor().0, 4);
        assert_eq!(console.top_row(), 2);
    }

    #[test]
    fn feeding_wakes_the_cursor() {
        let mut console = Console::new(3, 8);
        console.set_cursor_on(false);
        console.feed(b"x");
        assert!(console.cursor_on());
    }

    #[test]
    fn scrolling_is_bounded_by_history_and_cursor() {
        let mut console = Console::new(3, 8);
        for _ in 0..10 {
            console.feed(b"line\r\n");
        }
        let bottom = console.top_row();

        console.scroll_up(3);
        assert_eq!(console.top_row(), bottom - 3);
        console.scroll_up(100);
        assert_eq!(console.top_row(), 0);
        console.scroll_down(100);
        assert_eq!(console.top_row(), bottom);
    }

    #[test]
    fn compaction_drops_the_oldest_rows() {
        let mut console = Console::new(3, 8);
        console.feed(b"0\r\n");
        for _ in 0..TOTAL_ROWS - 1 {
            console.feed(b"x\r\n");
        }
        assert_eq!(console.cursor().0, TOTAL_ROWS - SHIFT_ROWS);
        assert_eq!(console.top_row(), TOTAL_ROWS - SHIFT_ROWS - 3 + 1);
        // Row zero's marker is gone; the first surviving row held an x.
        assert_eq!(console.grid().cell(0, 0).ch, 'x');
        assert_eq!(console.grid().cell(console.cursor().0, 0), Cell::BLANK);
    }

    proptest! {
        #[test]
        fn feeding_arbitrary_bytes_never_panics(
            chunks in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..600),
                1..6,
            )
        ) {
            let mut console = Console::new(8, 20);
            for chunk in &chunks {
                console.feed(chunk);
            }
            let (row, col) = console.cursor();
            prop_assert!(row < TOTAL_ROWS);
            prop_assert!(col < console.cols());
            prop_assert!(console.top_row() + console.rows() <= TOTAL_ROWS);
        }

        #[test]
        fn plain_text_is_chunking_invariant(
            text in proptest::collection::vec(
                prop_oneof![
                    proptest::char::range(' ', '~').prop_map(|c| c as u8),
                    Just(b'\n'),
                    Just(b'\r'),
                    Just(b'\t'),
                    Just(0x08u8),
                ],
                0..400,
            ),
            split in 0usize..=400,
        ) {
            let mut whole = Console::new(5, 12);
            whole.feed(&text);

            let mut split_fed = Console::new(5, 12);
            let at = split.min(text.len());
            split_fed.feed(&text[..at]);
            split_fed.feed(&text[at..]);

            prop_assert_eq!(whole, split_fed);
        }
    }
}
