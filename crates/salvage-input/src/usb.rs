//! Cable detection.
//!
//! A blocked [`KeyQueue::wait_key`](crate::queue::KeyQueue::wait_key) probes
//! the cable once per timeout cycle and keeps waiting for as long as a cable
//! is attached, so a device left plugged in never drops off the menu.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

/// Answers "is a USB cable attached right now".
///
/// Implementations must be cheap enough to call once every couple of
/// minutes from inside the key-wait loop.
pub trait UsbProbe: Send + Sync {
    fn cable_present(&self) -> bool;
}

/// Probe backed by a sysfs USB state file.
///
/// The kernel exposes the connection state as a short string; everything
/// starting with `C` (`CONNECTED`, `CONFIGURED`) counts as attached. A
/// missing or unreadable file reads as detached.
pub struct SysfsUsbProbe {
    path: PathBuf,
}

impl SysfsUsbProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UsbProbe for SysfsUsbProbe {
    fn cable_present(&self) -> bool {
        let mut byte = [0u8; 1];
        match File::open(&self.path).and_then(|mut f| f.read(&mut byte)) {
            Ok(n) => n == 1 && byte[0] == b'C',
            Err(err) => {
                debug!(path = %self.path.display(), %err, "usb state unreadable");
                false
            }
        }
    }
}

/// Probe with a fixed answer, for hosts without sysfs and for tests.
pub struct FixedProbe(pub bool);

impl UsbProbe for FixedProbe {
    fn cable_present(&self) -> bool {
        self.0
    }
}
