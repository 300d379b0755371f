//! Menu state and the pure navigation math.
//!
//! The display side is a window over the item rows: headers always
//! show, items scroll beneath them, and the selection drags the window
//! along. Navigation never lands on a non-selectable row; it steps over
//! captions and separators with wraparound, scanning at most one full
//! revolution so a menu of nothing but captions cannot hang the key
//! loop.

use salvage_input::{RawKey, keycodes};
use unicode_width::UnicodeWidthChar;

/// Hard cap on header plus item rows in one menu.
pub const MENU_MAX_ROWS: usize = 100;

/// What a raw key means to the menu loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuNav {
    HighlightUp,
    HighlightDown,
    Select,
    None,
}

/// Maps the navigation keys. Everything is inert while the text overlay
/// is hidden, so a key pressed against a bare icon only wakes the
/// screen.
#[must_use]
pub fn nav_for_key(code: RawKey, text_visible: bool) -> MenuNav {
    if !text_visible {
        return MenuNav::None;
    }
    match code {
        keycodes::KEY_DOWN | keycodes::KEY_VOLUMEDOWN => MenuNav::HighlightDown,
        keycodes::KEY_UP | keycodes::KEY_VOLUMEUP => MenuNav::HighlightUp,
        keycodes::KEY_REPLY | keycodes::KEY_CAMERA | keycodes::KEY_ENTER => MenuNav::Select,
        _ => MenuNav::None,
    }
}

/// One menu to run.
#[derive(Debug, Clone, Default)]
pub struct MenuSpec {
    /// Title block plus any per-menu header rows.
    pub headers: Vec<String>,
    /// Item rows, one per entry.
    pub items: Vec<String>,
    /// Parallel to `items`; false rows are captions the highlight skips.
    pub selectable: Vec<bool>,
    /// Leading header rows drawn in the title color, battery row first.
    pub title_rows: usize,
    /// Item highlighted when the menu opens.
    pub initial: usize,
    /// When set, keys outside the navigation set are ignored instead of
    /// firing the device's direct actions.
    pub menu_only: bool,
}

/// Forward-circular advance off a non-selectable starting row. The
/// start index comes back unchanged when nothing is selectable.
#[must_use]
pub fn initial_selection(selectable: &[bool], start: usize) -> usize {
    if selectable.is_empty() {
        return 0;
    }
    let start = start.min(selectable.len() - 1);
    let mut sel = start;
    while !selectable[sel] {
        sel = (sel + 1) % selectable.len();
        if sel == start {
            break;
        }
    }
    sel
}

/// One highlight step with wraparound, skipping non-selectable rows.
/// Returns `from` when a full revolution finds nothing selectable.
#[must_use]
pub fn next_selectable(selectable: &[bool], from: usize, down: bool) -> usize {
    let count = selectable.len();
    if count == 0 {
        return 0;
    }
    let mut sel = from.min(count - 1);
    for _ in 0..count {
        sel = if down { (sel + 1) % count } else { (sel + count - 1) % count };
        if selectable[sel] {
            return sel;
        }
    }
    from
}

/// Scrollbar thumb geometry as `(offset, length)` in pixels within a
/// `track`-pixel rail beside `visible` of `item_count` rows, the window
/// starting at `window_top`. Both edges truncate toward zero except
/// when the window ends at the last item, where the thumb is pinned
/// flush to the bottom so no gap shows below it.
#[must_use]
pub fn scrollbar_thumb(track: u32, item_count: usize, visible: usize, window_top: usize) -> (u32, u32) {
    if item_count == 0 {
        return (0, 0);
    }
    let fraction = track as f32 / item_count as f32;
    let length = (fraction * visible as f32) as u32;
    if window_top + visible == item_count {
        (track.saturating_sub(length), length)
    } else {
        ((window_top as f32 * fraction) as u32, length)
    }
}

/// Truncates to a column budget by display width.
fn fit_columns(text: &str, cols: usize) -> String {
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > cols {
            break;
        }
        out.push(ch);
        width += w;
    }
    out
}

/// The menu block as drawn: header and item rows pre-truncated to the
/// panel width, the highlight, and the scroll window.
#[derive(Debug, Clone, Default)]
pub struct MenuDisplay {
    pub visible: bool,
    rows: Vec<String>,
    title_rows: usize,
    header_rows: usize,
    item_count: usize,
    visible_items: usize,
    selected: usize,
    window_top: usize,
}

impl MenuDisplay {
    /// Populates and shows the menu. `text_rows` and `text_cols` are the
    /// panel dimensions; four rows stay reserved for the separator and
    /// breathing room above the log.
    pub fn start(
        &mut self,
        headers: &[String],
        items: &[String],
        title_rows: usize,
        start_sel: usize,
        text_rows: usize,
        text_cols: usize,
    ) {
        let mut rows = Vec::new();
        for header in headers.iter().take(MENU_MAX_ROWS) {
            rows.push(fit_columns(header, text_cols));
        }
        let header_rows = rows.len();
        for item in items.iter().take(MENU_MAX_ROWS - header_rows) {
            rows.push(fit_columns(item, text_cols));
        }
        let item_count = rows.len() - header_rows;
        let visible_items = text_rows
            .saturating_sub(4)
            .saturating_sub(header_rows)
            .min(item_count);
        self.rows = rows;
        self.title_rows = title_rows.min(header_rows);
        self.header_rows = header_rows;
        self.item_count = item_count;
        self.visible_items = visible_items;
        self.selected = start_sel.min(item_count.saturating_sub(1));
        self.window_top = if self.selected >= visible_items && visible_items > 0 {
            self.selected - visible_items + 1
        } else {
            0
        };
        self.visible = true;
    }

    /// Moves the highlight, dragging the window when it would leave
    /// view. Returns the clamped selection and whether anything changed.
    pub fn select(&mut self, sel: usize) -> (usize, bool) {
        if !self.visible || self.item_count == 0 {
            return (sel, false);
        }
        let sel = sel.min(self.item_count - 1);
        if sel == self.selected {
            return (sel, false);
        }
        self.selected = sel;
        if sel < self.window_top {
            self.window_top = sel;
        } else if self.visible_items > 0 && sel >= self.window_top + self.visible_items {
            self.window_top = sel - self.visible_items + 1;
        }
        (sel, true)
    }

    pub fn end(&mut self) {
        self.visible = false;
    }

    #[must_use]
    pub fn row(&self, index: usize) -> &str {
        &self.rows[index]
    }

    #[must_use]
    pub fn title_rows(&self) -> usize {
        self.title_rows
    }

    /// Index of the first item row; everything above is header.
    #[must_use]
    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    #[must_use]
    pub fn visible_items(&self) -> usize {
        self.visible_items
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn window_top(&self) -> usize {
        self.window_top
    }

    /// Whether the items overflow the window and need the scrollbar.
    #[must_use]
    pub fn scrolled(&self) -> bool {
        self.item_count > self.visible_items
    }
}
