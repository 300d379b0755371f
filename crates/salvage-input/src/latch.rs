//! Sticky modifier state.
//!
//! Slide-out keyboards are awkward to chord on, so caps and alt act as
//! latches: one press of the lock key holds the modifier until it is
//! pressed again. The caps latch mirrors itself to the keyboard's
//! shift indicator light when the device has one.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::layout::Modifiers;

/// Caps and alt latch state plus the optional indicator light.
#[derive(Debug, Default)]
pub struct Latches {
    caps: bool,
    alt: bool,
    indicator: Option<PathBuf>,
    indicator_failed: bool,
}

impl Latches {
    /// Starts with both latches off and the indicator light dark.
    pub fn new(indicator: Option<PathBuf>) -> Self {
        let mut latches = Self {
            caps: false,
            alt: false,
            indicator,
            indicator_failed: false,
        };
        latches.write_indicator();
        latches
    }

    #[must_use]
    pub fn caps(&self) -> bool {
        self.caps
    }

    #[must_use]
    pub fn alt(&self) -> bool {
        self.alt
    }

    pub fn toggle_caps(&mut self) {
        self.caps = !self.caps;
        self.write_indicator();
    }

    pub fn toggle_alt(&mut self) {
        self.alt = !self.alt;
    }

    /// Drops both latches, turning the indicator off.
    pub fn clear(&mut self) {
        self.alt = false;
        if self.caps {
            self.caps = false;
            self.write_indicator();
        }
    }

    /// Combines held modifier keys with the latches into a modifier set.
    #[must_use]
    pub fn modifiers(&self, shift_held: bool, alt_held: bool) -> Modifiers {
        let mut mods = Modifiers::empty();
        mods.set(Modifiers::SHIFT, shift_held);
        mods.set(Modifiers::ALT, alt_held);
        mods.set(Modifiers::CAPS_LATCH, self.caps);
        mods.set(Modifiers::ALT_LATCH, self.alt);
        mods
    }

    fn write_indicator(&mut self) {
        let Some(path) = &self.indicator else {
            return;
        };
        if self.indicator_failed {
            return;
        }
        let value = if self.caps { "255\n" } else { "0\n" };
        if let Err(err) = fs::write(path, value) {
            warn!(path = %path.display(), %err, "caps indicator unwritable");
            self.indicator_failed = true;
        }
    }
}
