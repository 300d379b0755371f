//! One character slot in the console grid.

use salvage_render::Rgb;

/// A single grid cell: the character and its foreground color.
///
/// There is no background attribute; the console paints one background
/// color for the whole screen and cells only carry the ink on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
}

impl Cell {
    /// A space with black ink, the state every cell starts in.
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: Rgb::BLACK,
    };

    #[must_use]
    pub const fn new(ch: char, fg: Rgb) -> Self {
        Self { ch, fg }
    }

    /// Whether the cell would leave visible ink on screen.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.ch == ' '
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}
