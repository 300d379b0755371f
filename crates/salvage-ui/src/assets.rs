//! Bitmap assets and per-device layout parameters.
//!
//! Assets load once at startup. A missing bitmap is logged and left as
//! a hole; every draw routine checks before blitting, so a stripped
//! image still boots to a usable text screen.

use salvage_render::{Renderer, Surface};
use tracing::error;

use crate::state::BackgroundIcon;

pub const ICON_INSTALLING: &str = "icon_installing";
pub const ICON_ERROR: &str = "icon_error";
pub const PROGRESS_EMPTY: &str = "progress_empty";
pub const PROGRESS_FILL: &str = "progress_fill";

/// Animation frame counts and overlay placement, fixed per device
/// image. The defaults describe a build with a static installing icon
/// and no spinner frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiParams {
    /// Spinner frames named `indeterminate01..`.
    pub indeterminate_frames: usize,
    /// Animation clock in frames per second.
    pub update_fps: u32,
    /// Overlay frames named `icon_installing_overlay01..`.
    pub installing_frames: usize,
    /// Overlay placement relative to the centered installing icon.
    pub overlay_offset_x: i32,
    pub overlay_offset_y: i32,
}

impl Default for UiParams {
    fn default() -> Self {
        Self {
            indeterminate_frames: 0,
            update_fps: 20,
            installing_frames: 0,
            overlay_offset_x: 0,
            overlay_offset_y: 0,
        }
    }
}

/// Every bitmap the UI draws.
#[derive(Debug, Default)]
pub struct Assets {
    icon_installing: Option<Surface>,
    icon_error: Option<Surface>,
    progress_empty: Option<Surface>,
    progress_fill: Option<Surface>,
    indeterminate: Vec<Option<Surface>>,
    overlay: Vec<Option<Surface>>,
    overlay_offset: (i32, i32),
}

impl Assets {
    /// Loads the fixed set plus numbered animation frames. Frame names
    /// are 1-based on disk. The overlay offset is shifted by the
    /// centered position of the installing icon so the frames land on
    /// top of it.
    pub fn load(renderer: &mut dyn Renderer, params: &UiParams) -> Self {
        let (fb_width, fb_height) = renderer.size();
        let mut assets = Assets {
            icon_installing: load_named(renderer, ICON_INSTALLING),
            icon_error: load_named(renderer, ICON_ERROR),
            progress_empty: load_named(renderer, PROGRESS_EMPTY),
            progress_fill: load_named(renderer, PROGRESS_FILL),
            indeterminate: Vec::new(),
            overlay: Vec::new(),
            overlay_offset: (params.overlay_offset_x, params.overlay_offset_y),
        };
        for i in 0..params.indeterminate_frames {
            let name = format!("indeterminate{:02}", i + 1);
            assets.indeterminate.push(load_named(renderer, &name));
        }
        for i in 0..params.installing_frames {
            let name = format!("icon_installing_overlay{:02}", i + 1);
            assets.overlay.push(load_named(renderer, &name));
        }
        if params.installing_frames > 0 {
            if let Some(icon) = &assets.icon_installing {
                assets.overlay_offset.0 += (fb_width as i32 - icon.width() as i32) / 2;
                assets.overlay_offset.1 += (fb_height as i32 - icon.height() as i32) / 2;
            }
        }
        assets
    }

    #[must_use]
    pub fn icon(&self, icon: BackgroundIcon) -> Option<&Surface> {
        match icon {
            BackgroundIcon::None => None,
            BackgroundIcon::Installing => self.icon_installing.as_ref(),
            BackgroundIcon::Error => self.icon_error.as_ref(),
        }
    }

    /// Height the progress layout reserves for the installing icon,
    /// zero when the bitmap is missing.
    #[must_use]
    pub fn installing_height(&self) -> u32 {
        self.icon_installing.as_ref().map_or(0, |s| s.height())
    }

    /// Dimensions of the progress strip.
    #[must_use]
    pub fn progress_size(&self) -> Option<(u32, u32)> {
        self.progress_empty.as_ref().map(|s| (s.width(), s.height()))
    }

    #[must_use]
    pub fn progress_fill(&self) -> Option<&Surface> {
        self.progress_fill.as_ref()
    }

    #[must_use]
    pub fn progress_empty(&self) -> Option<&Surface> {
        self.progress_empty.as_ref()
    }

    /// Spinner frame, wrapping the index. `None` when no frames loaded.
    #[must_use]
    pub fn indeterminate_frame(&self, frame: usize) -> Option<&Surface> {
        if self.indeterminate.is_empty() {
            return None;
        }
        self.indeterminate[frame % self.indeterminate.len()].as_ref()
    }

    /// Installing overlay frame, wrapping the index.
    #[must_use]
    pub fn overlay_frame(&self, frame: usize) -> Option<&Surface> {
        if self.overlay.is_empty() {
            return None;
        }
        self.overlay[frame % self.overlay.len()].as_ref()
    }

    #[must_use]
    pub fn overlay_offset(&self) -> (i32, i32) {
        self.overlay_offset
    }
}

fn load_named(renderer: &mut dyn Renderer, name: &str) -> Option<Surface> {
    match renderer.load_surface(name) {
        Ok(surface) => Some(surface),
        Err(err) => {
            error!(name, error = %err, "missing bitmap");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salvage_render::RecordingRenderer;

    #[test]
    fn missing_bitmaps_leave_holes() {
        let mut renderer = RecordingRenderer::new(540, 960).with_surface("icon_error", 100, 100);
        let assets = Assets::load(&mut renderer, &UiParams::default());
        assert!(assets.icon(BackgroundIcon::Error).is_some());
        assert!(assets.icon(BackgroundIcon::Installing).is_none());
        assert!(assets.progress_size().is_none());
        assert_eq!(assets.installing_height(), 0);
    }

    #[test]
    fn overlay_offset_tracks_the_centered_icon() {
        let mut renderer = RecordingRenderer::new(540, 960)
            .with_surface("icon_installing", 200, 300)
            .with_surface("icon_installing_overlay01", 20, 20);
        let params = UiParams {
            installing_frames: 1,
            overlay_offset_x: 5,
            overlay_offset_y: 7,
            ..UiParams::default()
        };
        let assets = Assets::load(&mut renderer, &params);
        assert_eq!(assets.overlay_offset(), (5 + 170, 7 + 330));
    }

    #[test]
    fn frame_lookups_wrap_and_tolerate_holes() {
        let mut renderer = RecordingRenderer::new(540, 960)
            .with_surface("indeterminate01", 30, 10);
        let params = UiParams {
            indeterminate_frames: 2,
            ..UiParams::default()
        };
        let assets = Assets::load(&mut renderer, &params);
        assert!(assets.indeterminate_frame(0).is_some());
        assert!(assets.indeterminate_frame(1).is_none());
        assert!(assets.indeterminate_frame(2).is_some());
        assert!(assets.overlay_frame(0).is_none());
    }
}
