//! Pixel rectangles.

/// An axis-aligned pixel rect. `x`/`y` may be negative (clipped by the
/// backend); width and height are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Builds a rect from two corners. Inverted corners yield an empty rect
    /// rather than a negative extent.
    #[must_use]
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let width = (x2 - x1).max(0) as u32;
        let height = (y2 - y1).max(0) as u32;
        Self { x: x1, y: y1, width, height }
    }

    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
