//! Built-in device profiles.
//!
//! Each profile names a keyboard layout and the sysfs control files of one
//! handset. The workstation profile carries no paths at all, which turns
//! every hardware touch into a no-op for development runs.

use salvage_input::{DevicePaths, DeviceProfile, qwerty};

/// All profiles this binary knows about, in listing order.
#[must_use]
pub fn builtin_profiles() -> Vec<DeviceProfile> {
    vec![photon_q(), workstation()]
}

/// Looks a profile up by its command-line id.
#[must_use]
pub fn find(id: &str) -> Option<DeviceProfile> {
    builtin_profiles().into_iter().find(|p| p.id == id)
}

/// Slide-out qwerty handset. The physical keyboard sits under a landscape
/// screen, so the console view draws rotated a quarter turn.
fn photon_q() -> DeviceProfile {
    let mut profile = DeviceProfile::new("photon-q", "Photon Q", qwerty::LAYOUT_NAME);
    profile.landscape_console = true;
    profile.paths = DevicePaths {
        battery_charge: Some("/sys/class/power_supply/battery/capacity".into()),
        battery_status: Some("/sys/class/power_supply/battery/status".into()),
        usb_state: Some("/sys/class/android_usb/android0/state".into()),
        lcd_backlight: Some("/sys/class/backlight/lcd-backlight/brightness".into()),
        keyboard_backlight: Some("/sys/class/leds/keyboard-backlight/brightness".into()),
        cpu_governor: Some("/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor".into()),
        led_rgb: Some([
            "/sys/class/leds/red/brightness".into(),
            "/sys/class/leds/green/brightness".into(),
            "/sys/class/leds/blue/brightness".into(),
        ]),
        caps_indicator: Some("/sys/class/leds/shift-key-light/brightness".into()),
    };
    profile
}

fn workstation() -> DeviceProfile {
    DeviceProfile::new("workstation", "Workstation", qwerty::LAYOUT_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photon_q_wires_every_sysfs_path() {
        let profile = find("photon-q").unwrap();
        assert!(profile.landscape_console);
        let paths = &profile.paths;
        assert!(paths.battery_charge.is_some());
        assert!(paths.battery_status.is_some());
        assert!(paths.usb_state.is_some());
        assert!(paths.lcd_backlight.is_some());
        assert!(paths.keyboard_backlight.is_some());
        assert!(paths.cpu_governor.is_some());
        assert!(paths.led_rgb.is_some());
        assert!(paths.caps_indicator.is_some());
    }

    #[test]
    fn workstation_runs_without_hardware() {
        let profile = find("workstation").unwrap();
        assert!(!profile.landscape_console);
        assert!(profile.paths.battery_charge.is_none());
        assert!(profile.paths.led_rgb.is_none());
    }

    #[test]
    fn unknown_id_finds_nothing() {
        assert!(find("tricorder").is_none());
    }
}
