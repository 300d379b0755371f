#![forbid(unsafe_code)]
//! Input plumbing for the recovery UI.
//!
//! Raw key events come in from an [`InputSource`] (evdev on device, a stdin
//! bridge on the host), run through the [`InputDispatcher`] which folds
//! trackball motion into synthetic arrow keys, and land in the [`KeyQueue`].
//! Consumers block on [`KeyQueue::wait_key`], which times out after two
//! minutes unless a USB cable is attached, and can be interrupted from
//! another thread.
//!
//! Key-to-character translation is table driven: a [`KeyboardLayout`] has
//! normal, shifted, and alternate layers, looked up by name through the
//! [`LayoutRegistry`]. A [`DeviceProfile`] ties a layout together with the
//! device's sysfs paths and key policy.

pub mod dispatch;
pub mod event;
pub mod keycodes;
pub mod latch;
pub mod layout;
pub mod profile;
pub mod queue;
pub mod qwerty;
pub mod repeat;
pub mod source;
pub mod usb;

pub use dispatch::{InputDispatcher, MOTION_THRESHOLD};
pub use event::InputEvent;
pub use keycodes::RawKey;
pub use latch::Latches;
pub use layout::{KeyChar, KeyboardLayout, Layer, LayoutRegistry, Modifiers};
pub use profile::{DevicePaths, DeviceProfile};
pub use queue::{KeyQueue, QUEUE_CAPACITY, WAIT_KEY_TIMEOUT, WaitOutcome};
pub use repeat::{REPEAT_TICK, REPEAT_WARMUP_TICKS, RepeatState, spawn_repeat_task};
pub use source::{InputSource, ScriptedSource, spawn_input_task};
pub use usb::{FixedProbe, SysfsUsbProbe, UsbProbe};
