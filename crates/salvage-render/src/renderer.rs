//! The renderer trait.

use crate::color::Rgba;
use crate::geometry::Rect;
use crate::surface::Surface;

/// Errors from a renderer backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The backend has no asset with this name. The UI logs the miss and
    /// keeps going with degraded visuals.
    #[error("missing asset {name:?}")]
    MissingAsset { name: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Immediate-mode drawing surface.
///
/// Calls draw into a back page; nothing is visible until [`flip`]. The
/// compositor serializes all access under its own lock, so implementations
/// do not need interior synchronization, but they must be `Send` because
/// background tasks repaint too.
///
/// The `_landscape` variants take coordinates in a rotated frame whose x
/// axis runs along the panel's long edge. Devices with a portrait panel
/// behind a landscape keyboard map them onto the panel; the defaults just
/// delegate to the unrotated calls.
///
/// [`flip`]: Renderer::flip
pub trait Renderer: Send {
    /// Panel size in pixels, `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Fixed glyph cell size in pixels, `(width, height)`.
    fn font_size(&self) -> (u32, u32);

    /// Looks up a named image asset.
    fn load_surface(&mut self, name: &str) -> Result<Surface, RenderError>;

    fn fill(&mut self, rect: Rect, color: Rgba);

    /// Copies `src` out of `surface` to `(dest_x, dest_y)`.
    fn blit(&mut self, surface: &Surface, src: Rect, dest_x: i32, dest_y: i32);

    /// Draws `text` with its baseline anchor at `(x, y)`.
    fn text(&mut self, x: i32, y: i32, text: &str, color: Rgba);

    fn fill_landscape(&mut self, rect: Rect, color: Rgba) {
        self.fill(rect, color);
    }

    fn text_landscape(&mut self, x: i32, y: i32, text: &str, color: Rgba) {
        self.text(x, y, text, color);
    }

    /// Makes the back page visible.
    fn flip(&mut self);
}
