//! Renderer backend that records draw calls, for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::color::Rgba;
use crate::geometry::Rect;
use crate::renderer::{RenderError, Renderer};
use crate::surface::Surface;

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Fill { rect: Rect, color: Rgba, rotated: bool },
    Blit { surface: String, src: Rect, dest: (i32, i32) },
    Text { x: i32, y: i32, text: String, color: Rgba, rotated: bool },
    Flip,
}

#[derive(Debug, Default)]
struct Inner {
    surfaces: HashMap<String, (u32, u32)>,
    ops: Vec<Op>,
    flips: usize,
    next_id: u64,
}

/// Records every draw call. Clones share the recording, so a test can keep
/// one handle while the compositor owns another.
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    width: u32,
    height: u32,
    char_width: u32,
    char_height: u32,
    inner: Arc<Mutex<Inner>>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            char_width: 10,
            char_height: 18,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    #[must_use]
    pub fn with_font(mut self, width: u32, height: u32) -> Self {
        self.char_width = width;
        self.char_height = height;
        self
    }

    /// Registers a fake asset so `load_surface` succeeds with these
    /// dimensions.
    #[must_use]
    pub fn with_surface(self, name: &str, width: u32, height: u32) -> Self {
        self.lock().surfaces.insert(name.to_owned(), (width, height));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[must_use]
    pub fn ops(&self) -> Vec<Op> {
        self.lock().ops.clone()
    }

    #[must_use]
    pub fn flips(&self) -> usize {
        self.lock().flips
    }

    /// All text payloads recorded so far, in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().ops.clear();
    }

    /// Ops recorded after the most recent flip.
    #[must_use]
    pub fn ops_since_flip(&self) -> Vec<Op> {
        let inner = self.lock();
        let start = inner
            .ops
            .iter()
            .rposition(|op| matches!(op, Op::Flip))
            .map_or(0, |i| i + 1);
        inner.ops[start..].to_vec()
    }
}

impl Renderer for RecordingRenderer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn font_size(&self) -> (u32, u32) {
        (self.char_width, self.char_height)
    }

    fn load_surface(&mut self, name: &str) -> Result<Surface, RenderError> {
        let mut inner = self.lock();
        match inner.surfaces.get(name) {
            Some(&(w, h)) => {
                inner.next_id += 1;
                Ok(Surface::new(inner.next_id, name, w, h))
            }
            None => Err(RenderError::MissingAsset { name: name.to_owned() }),
        }
    }

    fn fill(&mut self, rect: Rect, color: Rgba) {
        self.lock().ops.push(Op::Fill { rect, color, rotated: false });
    }

    fn blit(&mut self, surface: &Surface, src: Rect, dest_x: i32, dest_y: i32) {
        self.lock().ops.push(Op::Blit {
            surface: surface.name().to_owned(),
            src,
            dest: (dest_x, dest_y),
        });
    }

    fn text(&mut self, x: i32, y: i32, text: &str, color: Rgba) {
        self.lock().ops.push(Op::Text { x, y, text: text.to_owned(), color, rotated: false });
    }

    fn fill_landscape(&mut self, rect: Rect, color: Rgba) {
        self.lock().ops.push(Op::Fill { rect, color, rotated: true });
    }

    fn text_landscape(&mut self, x: i32, y: i32, text: &str, color: Rgba) {
        self.lock().ops.push(Op::Text { x, y, text: text.to_owned(), color, rotated: true });
    }

    fn flip(&mut self) {
        let mut inner = self.lock();
        inner.flips += 1;
        inner.ops.push(Op::Flip);
    }
}
