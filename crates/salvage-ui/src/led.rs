//! Notification LED driver.
//!
//! Requests only flip a target state under a mutex and signal a
//! condvar; a dedicated task owns the physical writes and the blink
//! clock. The half-period sleep happens with the lock released, so an
//! in-flight blink phase always completes even when the state changes
//! underneath it.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use salvage_render::Rgb;
use tracing::warn;

/// Time spent in each blink phase.
pub const BLINK_HALF_PERIOD: Duration = Duration::from_millis(800);

/// Target state of the notification LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedState {
    #[default]
    Off,
    On,
    /// Alternate on and off until told otherwise.
    Blink,
    /// One lit phase, then back to off.
    BlinkOnce,
}

/// Physical LED backend. `None` darkens every channel.
pub trait LedSink: Send {
    fn apply(&mut self, color: Option<Rgb>) -> io::Result<()>;
}

/// Writes per-channel brightness files under sysfs.
#[derive(Debug)]
pub struct SysfsLedSink {
    red: PathBuf,
    green: PathBuf,
    blue: PathBuf,
}

impl SysfsLedSink {
    #[must_use]
    pub fn new(channels: [PathBuf; 3]) -> Self {
        let [red, green, blue] = channels;
        Self { red, green, blue }
    }
}

impl LedSink for SysfsLedSink {
    fn apply(&mut self, color: Option<Rgb>) -> io::Result<()> {
        let (r, g, b) = match color {
            Some(color) => (color.r, color.g, color.b),
            None => (0, 0, 0),
        };
        fs::write(&self.red, format!("{r}\n"))?;
        fs::write(&self.green, format!("{g}\n"))?;
        fs::write(&self.blue, format!("{b}\n"))?;
        Ok(())
    }
}

/// Sink for devices without a notification LED.
#[derive(Debug, Default)]
pub struct NullLedSink;

impl LedSink for NullLedSink {
    fn apply(&mut self, _color: Option<Rgb>) -> io::Result<()> {
        Ok(())
    }
}

/// The LED state machine shared between requesters and the driver task.
pub struct LedController {
    state: Mutex<LedState>,
    changed: Condvar,
    color: Rgb,
    half_period: Duration,
}

impl LedController {
    #[must_use]
    pub fn new(color: Rgb) -> Self {
        Self::with_half_period(color, BLINK_HALF_PERIOD)
    }

    /// A controller with a custom blink period, for tests that cannot
    /// wait 800ms per phase.
    #[must_use]
    pub fn with_half_period(color: Rgb, half_period: Duration) -> Self {
        Self {
            state: Mutex::new(LedState::Off),
            changed: Condvar::new(),
            color,
            half_period,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_on(&self, on: bool) {
        *self.lock() = if on { LedState::On } else { LedState::Off };
        self.changed.notify_all();
    }

    /// `continuous` blinks until cancelled; otherwise a single flash.
    pub fn blink(&self, continuous: bool) {
        *self.lock() = if continuous {
            LedState::Blink
        } else {
            LedState::BlinkOnce
        };
        self.changed.notify_all();
    }

    #[must_use]
    pub fn state(&self) -> LedState {
        *self.lock()
    }

    /// The driver loop. Steady states park on the condvar; blink states
    /// hold each phase for the half period.
    pub fn run(&self, mut sink: Box<dyn LedSink>) {
        let mut lit = false;
        let mut sink_failed = false;
        loop {
            let mut hold = Duration::ZERO;
            {
                let mut state = self.lock();
                match *state {
                    LedState::Off => {
                        lit = false;
                        drive(sink.as_mut(), &mut sink_failed, None);
                        while *state == LedState::Off {
                            state = self
                                .changed
                                .wait(state)
                                .unwrap_or_else(|e| e.into_inner());
                        }
                    }
                    LedState::On => {
                        lit = true;
                        drive(sink.as_mut(), &mut sink_failed, Some(self.color));
                        while *state == LedState::On {
                            state = self
                                .changed
                                .wait(state)
                                .unwrap_or_else(|e| e.into_inner());
                        }
                    }
                    LedState::BlinkOnce => {
                        lit = true;
                        drive(sink.as_mut(), &mut sink_failed, Some(self.color));
                        hold = self.half_period;
                        *state = LedState::Off;
                    }
                    LedState::Blink => {
                        lit = !lit;
                        let color = if lit { Some(self.color) } else { None };
                        drive(sink.as_mut(), &mut sink_failed, color);
                        hold = self.half_period;
                    }
                }
            }
            if hold > Duration::ZERO {
                thread::sleep(hold);
            }
        }
    }
}

fn drive(sink: &mut dyn LedSink, failed: &mut bool, color: Option<Rgb>) {
    if *failed {
        return;
    }
    if let Err(err) = sink.apply(color) {
        warn!(error = %err, "led write failed, driver disabled");
        *failed = true;
    }
}

/// Spawns the driver task. It runs for the life of the process.
pub fn spawn_led_task(controller: Arc<LedController>, sink: Box<dyn LedSink>) -> JoinHandle<()> {
    thread::Builder::new()
        .name("led".into())
        .spawn(move || controller.run(sink))
        .expect("spawn led driver")
}
