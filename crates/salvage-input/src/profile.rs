//! Per-device configuration.
//!
//! A [`DeviceProfile`] bundles everything that differs between handsets:
//! which keyboard layout to use, which keys never auto-repeat, which keys
//! map straight to a menu action, whether the console renders landscape,
//! and where the device's sysfs control files live.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::keycodes::{self, RawKey};

/// Sysfs paths for the hardware this UI pokes at.
///
/// Every path is optional; a `None` turns the matching feature into a
/// no-op so the same binary runs on a workstation.
#[derive(Debug, Clone, Default)]
pub struct DevicePaths {
    /// Battery charge percentage, one decimal integer.
    pub battery_charge: Option<PathBuf>,
    /// Battery status string (`Charging`, `Discharging`, ...).
    pub battery_status: Option<PathBuf>,
    /// USB connection state file for the cable probe.
    pub usb_state: Option<PathBuf>,
    /// LCD backlight brightness control.
    pub lcd_backlight: Option<PathBuf>,
    /// Keyboard backlight brightness control.
    pub keyboard_backlight: Option<PathBuf>,
    /// CPU frequency governor control.
    pub cpu_governor: Option<PathBuf>,
    /// Red, green, and blue brightness files of the notification LED.
    pub led_rgb: Option<[PathBuf; 3]>,
    /// Caps-lock indicator light.
    pub caps_indicator: Option<PathBuf>,
}

/// Everything the UI needs to know about one device model.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    /// Short identifier used on the command line.
    pub id: String,
    /// Human-readable model name, shown in the console header.
    pub display_name: String,
    /// Name of the keyboard layout to resolve through the registry.
    pub layout: String,
    /// Whether the console draws rotated a quarter turn for a slide-out
    /// keyboard held sideways.
    pub landscape_console: bool,
    /// Keys excluded from auto-repeat. Modifier and select keys live here
    /// so holding shift or confirming a menu entry never storms the queue.
    pub non_repeating: HashSet<RawKey>,
    /// Keys that fire a menu action directly, bypassing the highlighted
    /// item. The value is an index into the current menu.
    pub direct_actions: HashMap<RawKey, usize>,
    pub paths: DevicePaths,
}

impl DeviceProfile {
    /// Builds a profile with the stock key policy and no sysfs paths.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        layout: impl Into<String>,
    ) -> Self {
        let non_repeating = [
            keycodes::KEY_LEFTSHIFT,
            keycodes::KEY_RIGHTSHIFT,
            keycodes::KEY_CAPSLOCK,
            keycodes::KEY_REPLY,
            keycodes::KEY_CAMERA,
            keycodes::KEY_ENTER,
        ]
        .into_iter()
        .collect();
        Self {
            id: id.into(),
            display_name: display_name.into(),
            layout: layout.into(),
            landscape_console: false,
            non_repeating,
            direct_actions: HashMap::new(),
            paths: DevicePaths::default(),
        }
    }

    /// Whether holding `code` should generate repeats.
    #[must_use]
    pub fn repeats(&self, code: RawKey) -> bool {
        !self.non_repeating.contains(&code)
    }

    /// Menu index bound directly to `code`, if any.
    #[must_use]
    pub fn direct_action(&self, code: RawKey) -> Option<usize> {
        self.direct_actions.get(&code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_and_select_keys_do_not_repeat() {
        let profile = DeviceProfile::new("t", "Test", "qwerty-slider");
        assert!(!profile.repeats(keycodes::KEY_LEFTSHIFT));
        assert!(!profile.repeats(keycodes::KEY_ENTER));
        assert!(profile.repeats(keycodes::KEY_A));
        assert!(profile.repeats(keycodes::KEY_BACKSPACE));
    }

    #[test]
    fn direct_actions_look_up_by_key() {
        let mut profile = DeviceProfile::new("t", "Test", "qwerty-slider");
        profile.direct_actions.insert(keycodes::KEY_CAMERA, 2);
        assert_eq!(profile.direct_action(keycodes::KEY_CAMERA), Some(2));
        assert_eq!(profile.direct_action(keycodes::KEY_A), None);
    }
}
