//! Idle screen-off tracking.
//!
//! The menu loop arms this timer while it blocks on the key queue and
//! the battery task ticks it once per poll. Fifteen polls at the two
//! second battery cadence puts the panel to sleep after thirty idle
//! seconds; any key disarms it, and the first key after a blackout is
//! swallowed to wake the screen.

/// Battery polls before an armed timer turns the screen off.
pub const IDLE_POLLS_TO_SCREEN_OFF: u32 = 15;

/// Screen-off countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleTimer {
    /// Nobody is waiting for input; never fires.
    #[default]
    Disarmed,
    /// Counting battery polls since the wait began.
    Armed(u32),
    /// The countdown fired and the panel is dark.
    ScreenOff,
}

impl IdleTimer {
    /// Starts (or restarts) the countdown. Also the path out of
    /// [`IdleTimer::ScreenOff`] once the wake-up key was swallowed.
    pub fn arm(&mut self) {
        *self = IdleTimer::Armed(0);
    }

    pub fn disarm(&mut self) {
        *self = IdleTimer::Disarmed;
    }

    /// One battery poll elapsed. Returns true exactly once, on the poll
    /// that crosses the threshold.
    pub fn tick(&mut self) -> bool {
        if let IdleTimer::Armed(polls) = self {
            *polls += 1;
            if *polls == IDLE_POLLS_TO_SCREEN_OFF {
                *self = IdleTimer::ScreenOff;
                return true;
            }
        }
        false
    }

    #[must_use]
    pub fn screen_is_off(&self) -> bool {
        matches!(self, IdleTimer::ScreenOff)
    }
}
