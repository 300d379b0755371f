//! The key queue and the blocking wait shared by every interactive loop.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::keycodes::{KEY_SLOTS, RawKey};
use crate::repeat::RepeatState;
use crate::usb::UsbProbe;

/// Keys buffered beyond this are dropped on the floor.
pub const QUEUE_CAPACITY: usize = 256;

/// How long [`KeyQueue::wait_key`] blocks before giving up, unless a USB
/// cable keeps the device claimed.
pub const WAIT_KEY_TIMEOUT: Duration = Duration::from_secs(120);

/// Result of a blocking key wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Key(RawKey),
    /// The timeout elapsed with no cable attached.
    TimedOut,
    /// Another thread called [`KeyQueue::wake`].
    Interrupted,
}

#[derive(Debug)]
struct QueueInner {
    queue: VecDeque<RawKey>,
    pressed: Box<[bool]>,
    last_down: Option<RawKey>,
    wake: bool,
}

impl QueueInner {
    fn enqueue(&mut self, code: RawKey) -> bool {
        if self.queue.len() < QUEUE_CAPACITY {
            self.queue.push_back(code);
            true
        } else {
            trace!(code, "key queue full, dropping event");
            false
        }
    }
}

/// Thread-safe FIFO of pressed keys plus the live pressed-key table.
///
/// Producers are the input dispatcher and the repeat task; consumers are
/// the menu loop, the console, and the text-input modal, one at a time.
/// A wake request is sticky: it persists until some waiter consumes it, so
/// it cannot be lost when it races the start of a wait.
pub struct KeyQueue {
    inner: Mutex<QueueInner>,
    ready: Condvar,
    timeout: Duration,
}

impl Default for KeyQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(WAIT_KEY_TIMEOUT)
    }

    /// A queue with a non-default wait timeout. Tests use short ones.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                queue: VecDeque::new(),
                pressed: vec![false; KEY_SLOTS].into_boxed_slice(),
                last_down: None,
                wake: false,
            }),
            ready: Condvar::new(),
            timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records a key event from a real input device: updates the pressed
    /// table and the last-held key, and enqueues presses and autorepeats.
    pub fn push_event(&self, code: RawKey, value: i32) {
        if code as usize >= KEY_SLOTS {
            return;
        }
        let mut inner = self.lock();
        inner.pressed[code as usize] = value != 0;
        if value == 1 {
            inner.last_down = Some(code);
        } else if value == 0 && inner.last_down == Some(code) {
            inner.last_down = None;
        }
        if value > 0 && inner.enqueue(code) {
            self.ready.notify_one();
        }
    }

    /// Enqueues a synthetic press. Synthetic keys never see a release, so
    /// they stay out of the pressed table and the last-held slot.
    pub fn inject(&self, code: RawKey) {
        if code as usize >= KEY_SLOTS {
            return;
        }
        let mut inner = self.lock();
        if inner.enqueue(code) {
            self.ready.notify_one();
        }
    }

    /// One 50ms repeat tick: observe the held key, feed the repeat state
    /// machine, and enqueue the synthesized repeat under the same lock.
    pub fn repeat_service(&self, state: &mut RepeatState, eligible: impl Fn(RawKey) -> bool) {
        let mut inner = self.lock();
        let held = inner.last_down;
        if let Some(code) = state.tick(held, &eligible) {
            if inner.enqueue(code) {
                self.ready.notify_one();
            }
        }
    }

    /// Blocks until a key arrives, the timeout lapses, or a wake request
    /// comes in. Every timeout is re-armed from scratch while a USB cable
    /// is attached, so a cabled device never drops off the menu loop.
    pub fn wait_key(&self, usb: &dyn UsbProbe) -> WaitOutcome {
        let mut inner = self.lock();
        loop {
            if inner.wake {
                inner.wake = false;
                return WaitOutcome::Interrupted;
            }
            let deadline = Instant::now() + self.timeout;
            let mut lapsed = false;
            while inner.queue.is_empty() && !lapsed {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let (guard, wait) = self
                    .ready
                    .wait_timeout(inner, remaining)
                    .unwrap_or_else(|e| e.into_inner());
                inner = guard;
                if inner.wake {
                    inner.wake = false;
                    return WaitOutcome::Interrupted;
                }
                if wait.timed_out() {
                    lapsed = true;
                }
            }
            if let Some(code) = inner.queue.pop_front() {
                return WaitOutcome::Key(code);
            }
            if !usb.cable_present() {
                return WaitOutcome::TimedOut;
            }
        }
    }

    /// Pops without blocking.
    pub fn try_pop(&self) -> Option<RawKey> {
        self.lock().queue.pop_front()
    }

    /// Interrupts the current (or next) blocked waiter.
    pub fn wake(&self) {
        let mut inner = self.lock();
        inner.wake = true;
        self.ready.notify_all();
    }

    pub fn clear(&self) {
        self.lock().queue.clear();
    }

    #[must_use]
    pub fn is_pressed(&self, code: RawKey) -> bool {
        if code as usize >= KEY_SLOTS {
            return false;
        }
        self.lock().pressed[code as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;
    use crate::keycodes::{KEY_A, KEY_B, KEY_ENTER};
    use crate::usb::FixedProbe;

    /// Reports an attached cable for the first `n` probes.
    struct CountedProbe(AtomicUsize);

    impl UsbProbe for CountedProbe {
        fn cable_present(&self) -> bool {
            loop {
                let left = self.0.load(Ordering::SeqCst);
                if left == 0 {
                    return false;
                }
                if self
                    .0
                    .compare_exchange(left, left - 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    return true;
                }
            }
        }
    }

    #[test]
    fn events_come_back_in_arrival_order() {
        let q = KeyQueue::new();
        q.push_event(KEY_A, 1);
        q.push_event(KEY_B, 1);
        q.push_event(KEY_ENTER, 1);
        assert_eq!(q.try_pop(), Some(KEY_A));
        assert_eq!(q.try_pop(), Some(KEY_B));
        assert_eq!(q.try_pop(), Some(KEY_ENTER));
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn releases_are_tracked_but_not_queued() {
        let q = KeyQueue::new();
        q.push_event(KEY_A, 1);
        assert!(q.is_pressed(KEY_A));
        q.push_event(KEY_A, 0);
        assert!(!q.is_pressed(KEY_A));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn overflow_drops_the_newest_event() {
        let q = KeyQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            q.push_event(KEY_A, 1);
        }
        q.push_event(KEY_B, 1);
        assert_eq!(q.len(), QUEUE_CAPACITY);
        for _ in 0..QUEUE_CAPACITY {
            assert_eq!(q.try_pop(), Some(KEY_A));
        }
    }

    #[test]
    fn release_of_a_different_key_keeps_last_held() {
        let q = KeyQueue::new();
        let mut state = RepeatState::default();
        q.push_event(KEY_A, 1);
        q.push_event(KEY_B, 0);
        q.clear();
        q.repeat_service(&mut state, |_| true);
        assert_eq!(state.current(), Some(KEY_A));
    }

    #[test]
    fn wait_times_out_with_a_distinct_outcome() {
        let q = KeyQueue::with_timeout(Duration::from_millis(30));
        let out = q.wait_key(&FixedProbe(false));
        assert_eq!(out, WaitOutcome::TimedOut);
    }

    #[test]
    fn wake_interrupts_a_blocked_waiter() {
        let q = Arc::new(KeyQueue::with_timeout(Duration::from_secs(30)));
        let waiter = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.wait_key(&FixedProbe(false)))
        };
        thread::sleep(Duration::from_millis(30));
        q.wake();
        assert_eq!(waiter.join().unwrap(), WaitOutcome::Interrupted);
    }

    #[test]
    fn wake_before_the_wait_is_consumed_once() {
        let q = KeyQueue::with_timeout(Duration::from_millis(30));
        q.wake();
        assert_eq!(q.wait_key(&FixedProbe(false)), WaitOutcome::Interrupted);
        assert_eq!(q.wait_key(&FixedProbe(false)), WaitOutcome::TimedOut);
    }

    #[test]
    fn attached_cable_rearms_the_timeout() {
        let q = KeyQueue::with_timeout(Duration::from_millis(25));
        let probe = CountedProbe(AtomicUsize::new(2));
        let start = Instant::now();
        let out = q.wait_key(&probe);
        assert_eq!(out, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(70));
    }

    #[test]
    fn queued_key_wins_over_waiting() {
        let q = KeyQueue::with_timeout(Duration::from_secs(30));
        q.push_event(KEY_ENTER, 1);
        assert_eq!(q.wait_key(&FixedProbe(false)), WaitOutcome::Key(KEY_ENTER));
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn any_injection_burst_keeps_order_and_capacity(
                codes in proptest::collection::vec(0u16..KEY_SLOTS as u16, 0..400)
            ) {
                let q = KeyQueue::new();
                for &code in &codes {
                    q.inject(code);
                }
                prop_assert!(q.len() <= QUEUE_CAPACITY);
                let kept = codes.len().min(QUEUE_CAPACITY);
                for &code in &codes[..kept] {
                    prop_assert_eq!(q.try_pop(), Some(code));
                }
                prop_assert_eq!(q.try_pop(), None);
            }
        }
    }
}
