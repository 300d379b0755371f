//! Folds raw input events into the key queue.

use std::sync::Arc;

use crate::event::InputEvent;
use crate::keycodes::{KEY_DOWN, KEY_UP};
use crate::queue::KeyQueue;

/// Accumulated trackball motion beyond this synthesizes an arrow key.
pub const MOTION_THRESHOLD: i32 = 3;

/// Per-source event translator. Key events pass straight through; vertical
/// motion accumulates until it crosses the threshold, then turns into a
/// synthetic up/down press. Any non-motion event resets the accumulator so
/// slow drift never adds up across other activity.
pub struct InputDispatcher {
    queue: Arc<KeyQueue>,
    rel_sum: i32,
}

impl InputDispatcher {
    #[must_use]
    pub fn new(queue: Arc<KeyQueue>) -> Self {
        Self { queue, rel_sum: 0 }
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Motion { delta } => {
                self.rel_sum += delta;
                if self.rel_sum > MOTION_THRESHOLD {
                    self.rel_sum = 0;
                    self.queue.inject(KEY_DOWN);
                } else if self.rel_sum < -MOTION_THRESHOLD {
                    self.rel_sum = 0;
                    self.queue.inject(KEY_UP);
                }
            }
            InputEvent::Key { code, value } => {
                self.rel_sum = 0;
                self.queue.push_event(code, value);
            }
            InputEvent::Other => {
                self.rel_sum = 0;
            }
        }
    }
}
