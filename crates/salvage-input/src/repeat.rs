//! Key repeat for held keys.
//!
//! A background task ticks every 50ms and watches the queue's last-held
//! key. After a debounce warmup the held key is re-enqueued once per tick
//! until it is released or another key takes over. Modifier and select
//! keys never repeat; which keys those are comes from the device profile.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::keycodes::RawKey;
use crate::profile::DeviceProfile;
use crate::queue::KeyQueue;

pub const REPEAT_TICK: Duration = Duration::from_millis(50);

/// Warmup ticks before a held key starts repeating (~700ms at 50ms/tick).
pub const REPEAT_WARMUP_TICKS: u32 = 14;

/// The repeat state machine, one tick at a time. Pure so it can be tested
/// without threads or clocks.
#[derive(Debug, Default)]
pub struct RepeatState {
    current: Option<RawKey>,
    ticks: u32,
    warmed_up: bool,
}

impl RepeatState {
    /// Advances one tick. `held` is the key currently held down, if any;
    /// returns a key to synthesize when the warmup has passed.
    pub fn tick(&mut self, held: Option<RawKey>, eligible: &impl Fn(RawKey) -> bool) -> Option<RawKey> {
        match self.current {
            Some(key) => {
                if held != Some(key) {
                    // Released or replaced; a new candidate is picked up
                    // on the next tick.
                    self.current = None;
                    return None;
                }
                if !self.warmed_up {
                    self.ticks += 1;
                    if self.ticks == REPEAT_WARMUP_TICKS {
                        self.warmed_up = true;
                    }
                    return None;
                }
                Some(key)
            }
            None => {
                match held {
                    Some(key) if eligible(key) => {
                        self.current = Some(key);
                        self.ticks = 0;
                        self.warmed_up = false;
                    }
                    _ => {}
                }
                None
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<RawKey> {
        self.current
    }
}

/// Spawns the repeat task. It runs for the life of the process.
pub fn spawn_repeat_task(queue: Arc<KeyQueue>, profile: Arc<DeviceProfile>) -> JoinHandle<()> {
    thread::Builder::new()
        .name("key-repeat".into())
        .spawn(move || {
            let mut state = RepeatState::default();
            loop {
                thread::sleep(REPEAT_TICK);
                queue.repeat_service(&mut state, |key| profile.repeats(key));
            }
        })
        .expect("spawn key repeat")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycodes::{KEY_DOWN, KEY_ENTER, KEY_LEFTSHIFT, KEY_UP};

    fn anything(_: RawKey) -> bool {
        true
    }

    #[test]
    fn repeats_start_after_the_warmup() {
        let mut state = RepeatState::default();
        // Pickup tick.
        assert_eq!(state.tick(Some(KEY_DOWN), &anything), None);
        for _ in 0..REPEAT_WARMUP_TICKS {
            assert_eq!(state.tick(Some(KEY_DOWN), &anything), None);
        }
        assert_eq!(state.tick(Some(KEY_DOWN), &anything), Some(KEY_DOWN));
        assert_eq!(state.tick(Some(KEY_DOWN), &anything), Some(KEY_DOWN));
    }

    #[test]
    fn release_stops_the_repeat() {
        let mut state = RepeatState::default();
        state.tick(Some(KEY_DOWN), &anything);
        for _ in 0..=REPEAT_WARMUP_TICKS {
            state.tick(Some(KEY_DOWN), &anything);
        }
        assert_eq!(state.tick(None, &anything), None);
        assert_eq!(state.current(), None);
    }

    #[test]
    fn switching_keys_restarts_the_warmup() {
        let mut state = RepeatState::default();
        state.tick(Some(KEY_DOWN), &anything);
        for _ in 0..5 {
            state.tick(Some(KEY_DOWN), &anything);
        }
        // New key: old candidate dropped this tick, picked up next tick.
        assert_eq!(state.tick(Some(KEY_UP), &anything), None);
        assert_eq!(state.tick(Some(KEY_UP), &anything), None);
        assert_eq!(state.current(), Some(KEY_UP));
        for _ in 0..REPEAT_WARMUP_TICKS {
            assert_eq!(state.tick(Some(KEY_UP), &anything), None);
        }
        assert_eq!(state.tick(Some(KEY_UP), &anything), Some(KEY_UP));
    }

    #[test]
    fn ineligible_keys_never_become_candidates() {
        let profile = DeviceProfile::new("t", "Test", "qwerty-slider");
        let eligible = |key: RawKey| profile.repeats(key);
        let mut state = RepeatState::default();
        for _ in 0..REPEAT_WARMUP_TICKS * 2 {
            assert_eq!(state.tick(Some(KEY_LEFTSHIFT), &eligible), None);
            assert_eq!(state.tick(Some(KEY_ENTER), &eligible), None);
        }
        assert_eq!(state.current(), None);
    }
}
