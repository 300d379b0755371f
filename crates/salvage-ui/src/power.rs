//! Panel and CPU power switches.
//!
//! Screen-on raises both backlights and pins the CPU governor to
//! `performance`; screen-off zeroes the backlights and drops the
//! governor to `powersave` so an idle recovery image stops draining
//! the battery. Paths are optional and failures only warn once, so
//! the same code runs on a workstation with no sysfs at all.

use std::fs;
use std::path::{Path, PathBuf};

use salvage_input::DevicePaths;
use tracing::{debug, warn};

const BACKLIGHT_ON: &str = "255\n";
const BACKLIGHT_OFF: &str = "0\n";
const GOVERNOR_ON: &str = "performance\n";
const GOVERNOR_OFF: &str = "powersave\n";

/// Writes the backlight and governor control files.
#[derive(Debug)]
pub struct ScreenPower {
    lcd: Option<PathBuf>,
    keyboard: Option<PathBuf>,
    governor: Option<PathBuf>,
    warned: bool,
}

impl ScreenPower {
    #[must_use]
    pub fn new(paths: &DevicePaths) -> Self {
        Self {
            lcd: paths.lcd_backlight.clone(),
            keyboard: paths.keyboard_backlight.clone(),
            governor: paths.cpu_governor.clone(),
            warned: false,
        }
    }

    pub fn on(&mut self) {
        debug!("screen on");
        self.apply(BACKLIGHT_ON, GOVERNOR_ON);
    }

    pub fn off(&mut self) {
        debug!("screen off");
        self.apply(BACKLIGHT_OFF, GOVERNOR_OFF);
    }

    fn apply(&mut self, brightness: &str, governor: &str) {
        let targets = [
            (self.lcd.clone(), brightness),
            (self.keyboard.clone(), brightness),
            (self.governor.clone(), governor),
        ];
        for (path, value) in targets {
            if let Some(path) = path {
                self.write(&path, value);
            }
        }
    }

    fn write(&mut self, path: &Path, value: &str) {
        if let Err(err) = fs::write(path, value) {
            if !self.warned {
                warn!(path = %path.display(), error = %err, "power control write failed");
                self.warned = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_in(dir: &Path) -> DevicePaths {
        DevicePaths {
            lcd_backlight: Some(dir.join("lcd")),
            keyboard_backlight: Some(dir.join("kbd")),
            cpu_governor: Some(dir.join("governor")),
            ..DevicePaths::default()
        }
    }

    #[test]
    fn on_raises_backlights_and_governor() {
        let dir = tempfile::tempdir().unwrap();
        let mut power = ScreenPower::new(&paths_in(dir.path()));
        power.on();
        assert_eq!(fs::read_to_string(dir.path().join("lcd")).unwrap(), "255\n");
        assert_eq!(fs::read_to_string(dir.path().join("kbd")).unwrap(), "255\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("governor")).unwrap(),
            "performance\n"
        );
    }

    #[test]
    fn off_drops_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut power = ScreenPower::new(&paths_in(dir.path()));
        power.on();
        power.off();
        assert_eq!(fs::read_to_string(dir.path().join("lcd")).unwrap(), "0\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("governor")).unwrap(),
            "powersave\n"
        );
    }

    #[test]
    fn missing_paths_are_a_no_op() {
        let mut power = ScreenPower::new(&DevicePaths::default());
        power.on();
        power.off();
    }

    #[test]
    fn unwritable_paths_do_not_panic() {
        let paths = DevicePaths {
            lcd_backlight: Some(PathBuf::from("/nonexistent/dir/brightness")),
            ..DevicePaths::default()
        };
        let mut power = ScreenPower::new(&paths);
        power.on();
        power.off();
    }
}
