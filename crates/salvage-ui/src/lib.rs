#![forbid(unsafe_code)]
//! The interactive runtime of the recovery image.
//!
//! A [`Compositor`] owns the renderer and all display state behind one
//! render lock and exposes the operations everything else calls: menu
//! display, the scrolling text log, progress bars, the console grid, and
//! the text-input modal. [`Ui`] wires the compositor together with the
//! key queue, keyboard layout, latches, LED, battery and power controls
//! for one device, spawns the persistent background tasks, and runs the
//! blocking flows: [`Ui::menu`], [`Ui::console`], and [`Ui::text_input`].
//!
//! Draw order, colors, and view geometry live in [`draw`] and [`theme`];
//! the pure menu window and scrollbar arithmetic in [`menu`] is testable
//! without a renderer.

pub mod assets;
pub mod battery;
pub mod compositor;
pub mod console;
pub mod draw;
pub mod idle;
pub mod led;
pub mod menu;
pub mod power;
pub mod progress;
pub mod service;
pub mod state;
mod text_input;
pub mod textlog;
pub mod theme;

pub use assets::{Assets, UiParams};
pub use battery::{BatteryReadout, BatterySource, SysfsBattery};
pub use compositor::Compositor;
pub use console::ConsoleOutcome;
pub use idle::{IDLE_POLLS_TO_SCREEN_OFF, IdleTimer};
pub use led::{LedController, LedSink, LedState, SysfsLedSink};
pub use menu::{MenuNav, MenuSpec, nav_for_key};
pub use power::ScreenPower;
pub use progress::BarMode;
pub use service::{Ui, UiError};
pub use state::{BackgroundIcon, USER_INPUT_TEXT_MAX, ViewMode};
pub use theme::Theme;
