//! Frame composition.
//!
//! One [`Frame`] borrows the renderer and a consistent snapshot of the
//! display state and paints the whole page for the current view mode.
//! Nothing here flips or mutates state; the compositor owns both.
//!
//! Layout is in pixels on a `char_w` by `char_h` cell raster. Text
//! baselines sit one pixel above the bottom of their cell row. The
//! console and the input box honor the landscape flag for devices whose
//! keyboard opens sideways; everything else draws in panel orientation.

use salvage_render::{Rect, Renderer, Rgba};
use salvage_term::DEFAULT_FRONT;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::assets::Assets;
use crate::battery::BatteryReadout;
use crate::menu::scrollbar_thumb;
use crate::progress::BarMode;
use crate::state::{BackgroundIcon, DisplayState, USER_INPUT_TEXT_MAX, ViewMode};
use crate::theme::Theme;

/// Merges the battery readout into the right edge of the title row.
/// The title is truncated or space-padded so the readout lands flush
/// with the last column, one space separating the two when the title
/// had to give way.
#[must_use]
pub fn title_with_battery(title: &str, cols: usize, battery: &BatteryReadout) -> String {
    let readout = if battery.charge < 0 {
        "N/A".to_owned()
    } else {
        format!(
            "{}%{}",
            battery.charge,
            if battery.charging { '+' } else { ' ' }
        )
    };
    let keep = cols.saturating_sub(readout.width());
    let mut row = String::new();
    let mut width = 0;
    if title.width() > keep {
        let budget = keep.saturating_sub(1);
        for ch in title.chars() {
            let w = ch.width().unwrap_or(0);
            if width + w > budget {
                break;
            }
            row.push(ch);
            width += w;
        }
    } else {
        row.push_str(title);
        width = title.width();
    }
    while width < keep {
        row.push(' ');
        width += 1;
    }
    row.push_str(&readout);
    row
}

/// One frame's worth of painting.
pub(crate) struct Frame<'a> {
    pub r: &'a mut dyn Renderer,
    pub state: &'a DisplayState,
    pub assets: &'a Assets,
    pub theme: &'a Theme,
    pub char_w: u32,
    pub char_h: u32,
    pub landscape: bool,
}

impl Frame<'_> {
    pub(crate) fn draw_screen(&mut self) {
        match self.state.mode {
            ViewMode::Console => self.draw_console(),
            ViewMode::TextInput => {
                self.draw_background();
                self.wash();
                self.draw_input_box();
            }
            ViewMode::Normal => {
                self.draw_background();
                self.draw_progress();
                if self.state.show_text {
                    self.wash();
                    let first_log_row = if self.state.menu.visible {
                        self.draw_menu_block()
                    } else {
                        0
                    };
                    self.draw_log(first_log_row);
                }
            }
        }
    }

    /// Translucent layer between the icon and the text.
    fn wash(&mut self) {
        let (w, h) = self.r.size();
        self.r.fill(Rect::new(0, 0, w, h), self.theme.background);
    }

    fn draw_background(&mut self) {
        let (w, h) = self.r.size();
        self.r.fill(Rect::new(0, 0, w, h), Rgba::BLACK);
        if self.state.icon == BackgroundIcon::None {
            return;
        }
        if let Some(icon) = self.assets.icon(self.state.icon) {
            let x = (w as i32 - icon.width() as i32) / 2;
            let y = (h as i32 - icon.height() as i32) / 2;
            self.r
                .blit(icon, Rect::new(0, 0, icon.width(), icon.height()), x, y);
        }
        if self.state.icon == BackgroundIcon::Installing {
            self.draw_overlay();
        }
    }

    /// Installing animation frame over the base icon. No page flip; the
    /// animator stages it and the next flip carries it out.
    pub(crate) fn draw_overlay(&mut self) {
        if let Some(frame) = self.assets.overlay_frame(self.state.installing_frame) {
            let (dx, dy) = self.assets.overlay_offset();
            self.r
                .blit(frame, Rect::new(0, 0, frame.width(), frame.height()), dx, dy);
        }
    }

    /// The progress strip, centered between icon and screen bottom.
    pub(crate) fn draw_progress(&mut self) {
        if self.state.progress.mode == BarMode::None {
            return;
        }
        let Some((bar_w, bar_h)) = self.assets.progress_size() else {
            return;
        };
        let (fb_w, fb_h) = self.r.size();
        let icon_h = self.assets.installing_height();
        let dx = (fb_w as i32 - bar_w as i32) / 2;
        let dy = (3 * fb_h as i32 + icon_h as i32 - 2 * bar_h as i32) / 4;

        // erase behind the strip in case this is a progress-only update
        self.r.fill(Rect::new(dx, dy, bar_w, bar_h), Rgba::BLACK);

        match self.state.progress.mode {
            BarMode::Normal => {
                let pos = (self.state.progress.position() * bar_w as f32) as i32;
                if pos > 0 {
                    if let Some(fill) = self.assets.progress_fill() {
                        self.r.blit(fill, Rect::new(0, 0, pos as u32, bar_h), dx, dy);
                    }
                }
                if pos < bar_w as i32 - 1 {
                    if let Some(empty) = self.assets.progress_empty() {
                        let src = Rect::new(pos, 0, (bar_w as i32 - pos) as u32, bar_h);
                        self.r.blit(empty, src, dx + pos, dy);
                    }
                }
            }
            BarMode::Indeterminate => {
                if let Some(frame) = self
                    .assets
                    .indeterminate_frame(self.state.progress.spinner_frame)
                {
                    self.r.blit(frame, Rect::new(0, 0, bar_w, bar_h), dx, dy);
                }
            }
            BarMode::None => {}
        }
    }

    fn draw_text_row(&mut self, screen_row: usize, text: &str, color: Rgba) {
        if text.is_empty() {
            return;
        }
        let y = (screen_row as i32 + 1) * self.char_h as i32 - 1;
        self.r.text(0, y, text, color);
    }

    /// Headers, items, separator, and scrollbar. Returns the first
    /// screen row left for the log.
    fn draw_menu_block(&mut self) -> usize {
        let menu = &self.state.menu;
        let ch = self.char_h as i32;
        let (fb_w, _) = self.r.size();
        let title = self.theme.title.with_alpha(255);
        let plain = self.theme.menu.with_alpha(255);
        let selected = self.theme.menu_selected.with_alpha(255);

        if menu.item_count() > 0 {
            let hl_row = (menu.header_rows() + menu.selected() - menu.window_top()) as i32;
            let bar = Rect::from_corners(0, hl_row * ch, fb_w as i32, (hl_row + 1) * ch + 1);
            self.r.fill(bar, plain);
        }

        if menu.title_rows() > 0 {
            let merged = title_with_battery(menu.row(0), self.state.log.cols(), &self.state.battery);
            self.draw_text_row(0, &merged, title);
            for row in 1..menu.title_rows() {
                self.draw_text_row(row, menu.row(row), title);
            }
        }
        for row in menu.title_rows()..menu.header_rows() {
            self.draw_text_row(row, menu.row(row), plain);
        }

        for screen_row in menu.header_rows()..menu.header_rows() + menu.visible_items() {
            let row_index = screen_row + menu.window_top();
            let color = if row_index == menu.header_rows() + menu.selected() {
                selected
            } else {
                plain
            };
            self.draw_text_row(screen_row, menu.row(row_index), color);
        }

        let mut next = menu.header_rows() + menu.visible_items();
        let rule_y = next as i32 * ch + ch / 2;
        self.r
            .fill(Rect::from_corners(0, rule_y - 1, fb_w as i32, rule_y + 1), plain);
        next += 1;

        if menu.scrolled() {
            self.draw_scrollbar();
        }
        next
    }

    fn draw_scrollbar(&mut self) {
        let menu = &self.state.menu;
        let track = menu.visible_items() as u32 * self.char_h + 1;
        let top = (menu.header_rows() as u32 * self.char_h) as i32;
        let (fb_w, _) = self.r.size();
        let x = fb_w as i32 - self.char_w as i32;
        self.r.fill(
            Rect::new(x, top, self.char_w, track),
            self.theme.menu.with_alpha(255),
        );
        let (offset, length) = scrollbar_thumb(
            track,
            menu.item_count(),
            menu.visible_items(),
            menu.window_top(),
        );
        self.r.fill(
            Rect::new(x, top + offset as i32, self.char_w, length),
            self.theme.menu_selected.with_alpha(255),
        );
    }

    fn draw_log(&mut self, first_row: usize) {
        let color = self.theme.script.with_alpha(255);
        for slot in first_row..self.state.log.rows() {
            self.draw_text_row(slot, self.state.log.visible_row(slot), color);
        }
    }

    fn draw_console(&mut self) {
        let Some(console) = &self.state.console else {
            return;
        };
        let (w, h) = self.r.size();
        self.r.fill(Rect::new(0, 0, w, h), Rgba::BLACK);

        let cw = self.char_w as i32;
        let ch = self.char_h as i32;
        let (cursor_row, cursor_col) = console.cursor();
        let top = console.top_row();
        let mut cursor_screen_row = None;
        let mut glyph = [0u8; 4];

        for row in top..top + console.rows() {
            let screen_row = (row - top) as i32;
            let y = (screen_row + 1) * ch - 1;
            for (col, cell) in console.grid().row(row).iter().enumerate() {
                if cell.ch == ' ' {
                    continue;
                }
                let text = cell.ch.encode_utf8(&mut glyph);
                self.text_oriented(col as i32 * cw, y, text, cell.fg.with_alpha(255));
            }
            // rows past the cursor are stale scrollback, stop here
            if row == cursor_row {
                cursor_screen_row = Some(screen_row);
                break;
            }
        }

        if console.cursor_on() {
            if let Some(screen_row) = cursor_screen_row {
                let x = cursor_col as i32 * cw;
                let block = Rect::new(x, screen_row * ch, self.char_w, self.char_h);
                self.fill_oriented(block, DEFAULT_FRONT.with_alpha(255));
                let under = console.grid().cell(cursor_row, cursor_col);
                if under.ch != ' ' {
                    let text = under.ch.encode_utf8(&mut glyph);
                    self.text_oriented(x, (screen_row + 1) * ch - 1, text, Rgba::BLACK);
                }
            }
        }
    }

    /// The bordered input field, centered in keyboard orientation. The
    /// border leaves one char cell of padding around the field.
    fn draw_input_box(&mut self) {
        let Some(input) = &self.state.input else {
            return;
        };
        let (fb_w, fb_h) = self.r.size();
        let (lw, lh) = if self.landscape {
            (fb_h as i32, fb_w as i32)
        } else {
            (fb_w as i32, fb_h as i32)
        };
        let cw = self.char_w as i32;
        let ch = self.char_h as i32;
        let bw = cw * USER_INPUT_TEXT_MAX as i32;
        let bh = 3 * ch;
        let rx = lw / 2 - bw / 2 - cw / 2;
        let ry = lh / 2 - bh / 2 - ch / 2;
        let tx = lw / 2 - bw / 2;
        let ty = lh / 2 - bh / 2;

        let border = self.theme.menu.with_alpha(255);
        let right = rx + bw + cw;
        let bottom = ry + bh + ch;
        self.fill_oriented(Rect::from_corners(rx - 1, ry - 1, right + 1, ry + 1), border);
        self.fill_oriented(
            Rect::from_corners(right - 1, ry - 1, right + 1, bottom + 1),
            border,
        );
        self.fill_oriented(Rect::from_corners(rx - 1, ry - 1, rx + 1, bottom + 1), border);
        self.fill_oriented(
            Rect::from_corners(rx - 1, bottom - 1, right + 1, bottom + 1),
            border,
        );

        self.text_oriented(tx, ty + ch, &input.header, border);
        self.text_oriented(
            tx,
            ty + 3 * ch,
            &input.display_line(),
            self.theme.script.with_alpha(255),
        );
    }

    fn fill_oriented(&mut self, rect: Rect, color: Rgba) {
        if self.landscape {
            self.r.fill_landscape(rect, color);
        } else {
            self.r.fill(rect, color);
        }
    }

    fn text_oriented(&mut self, x: i32, y: i32, text: &str, color: Rgba) {
        if self.landscape {
            self.r.text_landscape(x, y, text, color);
        } else {
            self.r.text(x, y, text, color);
        }
    }
}
