//! Battery polling.
//!
//! A background task reads the charge and status files every two
//! seconds, pushes changed readouts at the compositor for the title
//! row, and drives the idle screen-off countdown on the same cadence.
//! The task ends quietly if the files stop opening; a device with no
//! battery interface just never shows a readout.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::compositor::Compositor;
use crate::idle::IdleTimer;
use crate::power::ScreenPower;

/// Delay between battery reads.
pub const BATTERY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// One battery sample. A negative charge means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReadout {
    pub charge: i32,
    pub charging: bool,
}

impl Default for BatteryReadout {
    fn default() -> Self {
        Self {
            charge: -1,
            charging: false,
        }
    }
}

/// Where battery samples come from.
pub trait BatterySource: Send {
    /// An error ends the polling task.
    fn read(&mut self) -> io::Result<BatteryReadout>;
}

/// Reads the kernel power-supply charge and status files.
#[derive(Debug)]
pub struct SysfsBattery {
    charge: PathBuf,
    status: PathBuf,
}

impl SysfsBattery {
    #[must_use]
    pub fn new(charge: impl Into<PathBuf>, status: impl Into<PathBuf>) -> Self {
        Self {
            charge: charge.into(),
            status: status.into(),
        }
    }
}

impl BatterySource for SysfsBattery {
    fn read(&mut self) -> io::Result<BatteryReadout> {
        let raw = fs::read_to_string(&self.charge)?;
        let charge = raw.trim().parse::<i32>().unwrap_or(-1);
        let status = fs::read_to_string(&self.status)?;
        Ok(BatteryReadout {
            charge,
            charging: status.starts_with("Charging"),
        })
    }
}

/// Spawns the poll loop. The first sample is taken immediately, the
/// idle timer ticks once per sample, and the screen powers off on the
/// tick that crosses the idle threshold.
pub fn spawn_battery_task(
    compositor: Arc<Compositor>,
    power: Arc<Mutex<ScreenPower>>,
    idle: Arc<Mutex<IdleTimer>>,
    mut source: Box<dyn BatterySource>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("battery".into())
        .spawn(move || loop {
            let readout = match source.read() {
                Ok(readout) => readout,
                Err(err) => {
                    warn!(error = %err, "battery source failed, polling stopped");
                    return;
                }
            };
            debug!(charge = readout.charge, charging = readout.charging, "battery poll");
            compositor.set_battery(readout);
            let fired = idle.lock().unwrap_or_else(|e| e.into_inner()).tick();
            if fired {
                power.lock().unwrap_or_else(|e| e.into_inner()).off();
            }
            thread::sleep(BATTERY_POLL_INTERVAL);
        })
        .expect("spawn battery poller")
}
