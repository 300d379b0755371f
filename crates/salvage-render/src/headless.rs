//! Renderer backend with no output, for running the stack on a desktop.

use tracing::trace;

use crate::color::Rgba;
use crate::geometry::Rect;
use crate::renderer::{RenderError, Renderer};
use crate::surface::Surface;

const DEFAULT_FONT: (u32, u32) = (10, 18);

/// Discards all drawing, logging each call at trace level. Asset loads
/// always miss, which exercises the UI's degraded paths the same way a
/// device image with a broken resource partition would.
#[derive(Debug)]
pub struct HeadlessRenderer {
    width: u32,
    height: u32,
    char_width: u32,
    char_height: u32,
    flips: u64,
}

impl HeadlessRenderer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            char_width: DEFAULT_FONT.0,
            char_height: DEFAULT_FONT.1,
            flips: 0,
        }
    }

    #[must_use]
    pub fn with_font(mut self, width: u32, height: u32) -> Self {
        self.char_width = width;
        self.char_height = height;
        self
    }

    #[must_use]
    pub fn flips(&self) -> u64 {
        self.flips
    }
}

impl Renderer for HeadlessRenderer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn font_size(&self) -> (u32, u32) {
        (self.char_width, self.char_height)
    }

    fn load_surface(&mut self, name: &str) -> Result<Surface, RenderError> {
        Err(RenderError::MissingAsset { name: name.to_owned() })
    }

    fn fill(&mut self, rect: Rect, color: Rgba) {
        trace!(?rect, ?color, "fill");
    }

    fn blit(&mut self, surface: &Surface, src: Rect, dest_x: i32, dest_y: i32) {
        trace!(surface = surface.name(), ?src, dest_x, dest_y, "blit");
    }

    fn text(&mut self, x: i32, y: i32, text: &str, color: Rgba) {
        trace!(x, y, text, ?color, "text");
    }

    fn flip(&mut self) {
        self.flips += 1;
        trace!(flips = self.flips, "flip");
    }
}
