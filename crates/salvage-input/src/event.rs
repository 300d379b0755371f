//! Raw events as delivered by an input backend.

use crate::keycodes::RawKey;

/// One decoded input event.
///
/// `value` follows evdev: 0 release, 1 press, 2 autorepeat. Motion carries
/// the vertical delta of a trackball or scroll wheel; other axes and event
/// types collapse to [`InputEvent::Other`], which only resets the motion
/// accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key { code: RawKey, value: i32 },
    Motion { delta: i32 },
    Other,
}

impl InputEvent {
    #[must_use]
    pub fn press(code: RawKey) -> Self {
        InputEvent::Key { code, value: 1 }
    }

    #[must_use]
    pub fn release(code: RawKey) -> Self {
        InputEvent::Key { code, value: 0 }
    }
}
