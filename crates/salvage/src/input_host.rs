//! Input backends for the binary.
//!
//! On a device, [`EvdevSource`] fans every `/dev/input/event*` reader into
//! one stream. On a workstation, [`StdinSource`] turns lines into key
//! taps: `up`, `down`, and `enter` press the matching key, and any other
//! line presses one key per character, so `exit` followed by `enter`
//! types into a console session.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use salvage_input::{InputEvent, InputSource, RawKey, keycodes};
use tracing::{debug, warn};

const EV_SYN: u16 = 0;
const EV_KEY: u16 = 1;
const EV_REL: u16 = 2;
const REL_Y: u16 = 1;

// struct input_event: timeval, then type, code, value.
#[cfg(target_pointer_width = "64")]
const EVENT_BYTES: usize = 24;
#[cfg(not(target_pointer_width = "64"))]
const EVENT_BYTES: usize = 16;

/// Merged stream over every event device found at startup.
pub struct EvdevSource {
    events: Receiver<InputEvent>,
}

impl EvdevSource {
    /// Scans `dir` for `event*` nodes and starts a reader thread per
    /// device. Fails if nothing could be opened; a device that opens and
    /// later disappears just ends its thread.
    pub fn open(dir: &Path) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut readers = 0u32;
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with("event") {
                continue;
            }
            let path = entry.path();
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping event device");
                    continue;
                }
            };
            let tx = tx.clone();
            thread::Builder::new()
                .name(format!("evdev-{name}"))
                .spawn(move || pump(file, &tx))
                .expect("spawn evdev reader");
            readers += 1;
        }
        if readers == 0 {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no event devices under {}", dir.display()),
            ));
        }
        debug!(readers, "event devices open");
        Ok(Self { events: rx })
    }
}

impl InputSource for EvdevSource {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.events.recv().ok()
    }
}

fn pump(mut file: File, tx: &Sender<InputEvent>) {
    let mut buf = [0u8; EVENT_BYTES];
    while file.read_exact(&mut buf).is_ok() {
        let Some(event) = decode(&buf) else { continue };
        if tx.send(event).is_err() {
            break;
        }
    }
}

/// Decodes one raw record. Sync markers vanish; everything else maps to
/// a key, a vertical motion, or the accumulator-resetting `Other`.
fn decode(buf: &[u8; EVENT_BYTES]) -> Option<InputEvent> {
    let base = EVENT_BYTES - 8;
    let kind = u16::from_ne_bytes([buf[base], buf[base + 1]]);
    let code = u16::from_ne_bytes([buf[base + 2], buf[base + 3]]);
    let value = i32::from_ne_bytes([
        buf[base + 4],
        buf[base + 5],
        buf[base + 6],
        buf[base + 7],
    ]);
    match (kind, code) {
        (EV_SYN, _) => None,
        (EV_KEY, code) => Some(InputEvent::Key { code, value }),
        (EV_REL, REL_Y) => Some(InputEvent::Motion { delta: value }),
        _ => Some(InputEvent::Other),
    }
}

/// Line-oriented keyboard bridge over stdin.
pub struct StdinSource {
    input: io::Stdin,
    pending: VecDeque<InputEvent>,
}

impl StdinSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: io::stdin(),
            pending: VecDeque::new(),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for StdinSource {
    fn next_event(&mut self) -> Option<InputEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {
                    let line = line.trim_end_matches(['\r', '\n']);
                    self.pending.extend(events_for_line(line));
                }
            }
        }
    }
}

/// Key taps for one bridge line.
fn events_for_line(line: &str) -> Vec<InputEvent> {
    let mut events = Vec::new();
    match line {
        "up" => tap(&mut events, keycodes::KEY_UP),
        "down" => tap(&mut events, keycodes::KEY_DOWN),
        "enter" => tap(&mut events, keycodes::KEY_ENTER),
        other => {
            for c in other.chars() {
                match key_for_char(c) {
                    Some(code) => tap(&mut events, code),
                    None => debug!(char = %c, "no key for character"),
                }
            }
        }
    }
    events
}

fn tap(events: &mut Vec<InputEvent>, code: RawKey) {
    events.push(InputEvent::press(code));
    events.push(InputEvent::release(code));
}

fn key_for_char(c: char) -> Option<RawKey> {
    let code = match c.to_ascii_lowercase() {
        'a' => keycodes::KEY_A,
        'b' => keycodes::KEY_B,
        'c' => keycodes::KEY_C,
        'd' => keycodes::KEY_D,
        'e' => keycodes::KEY_E,
        'f' => keycodes::KEY_F,
        'g' => keycodes::KEY_G,
        'h' => keycodes::KEY_H,
        'i' => keycodes::KEY_I,
        'j' => keycodes::KEY_J,
        'k' => keycodes::KEY_K,
        'l' => keycodes::KEY_L,
        'm' => keycodes::KEY_M,
        'n' => keycodes::KEY_N,
        'o' => keycodes::KEY_O,
        'p' => keycodes::KEY_P,
        'q' => keycodes::KEY_Q,
        'r' => keycodes::KEY_R,
        's' => keycodes::KEY_S,
        't' => keycodes::KEY_T,
        'u' => keycodes::KEY_U,
        'v' => keycodes::KEY_V,
        'w' => keycodes::KEY_W,
        'x' => keycodes::KEY_X,
        'y' => keycodes::KEY_Y,
        'z' => keycodes::KEY_Z,
        '0' => keycodes::KEY_0,
        '1' => keycodes::KEY_1,
        '2' => keycodes::KEY_2,
        '3' => keycodes::KEY_3,
        '4' => keycodes::KEY_4,
        '5' => keycodes::KEY_5,
        '6' => keycodes::KEY_6,
        '7' => keycodes::KEY_7,
        '8' => keycodes::KEY_8,
        '9' => keycodes::KEY_9,
        '-' => keycodes::KEY_MINUS,
        ' ' => keycodes::KEY_SPACE,
        _ => return None,
    };
    Some(code)
}
