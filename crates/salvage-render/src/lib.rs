#![forbid(unsafe_code)]
//! Drawing abstraction for the recovery UI.
//!
//! Everything above this crate draws through the [`Renderer`] trait: a small
//! immediate-mode surface with rect fills, text at pixel positions, surface
//! blits, and an explicit page flip. Device images implement it on top of
//! their panel; this crate ships two host-side backends:
//!
//! - [`HeadlessRenderer`]: no output, logs draw calls at trace level. Used by
//!   the development harness.
//! - [`RecordingRenderer`]: captures every draw call for inspection. Used by
//!   tests.

pub mod color;
pub mod geometry;
pub mod headless;
pub mod recording;
pub mod renderer;
pub mod surface;

pub use color::{Rgb, Rgba};
pub use geometry::Rect;
pub use headless::HeadlessRenderer;
pub use recording::{Op, RecordingRenderer};
pub use renderer::{RenderError, Renderer};
pub use surface::Surface;
