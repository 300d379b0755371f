//! The interactive console session.
//!
//! Runs a shell on a pty sized to the console panel and bridges it to
//! the keyboard and the terminal screen. Three threads cooperate: the
//! caller's key loop, an output pump feeding shell bytes to the
//! compositor, and a blink task driving the cursor. The pump owns
//! session teardown detection; it trips a flag and wakes the key loop
//! when the shell side closes.
//!
//! A session ends one of three ways: the shell exits, the sym+delete
//! chord force-kills it, or it never started. The kill chord exists
//! because a hung shell would otherwise strand the whole recovery UI,
//! there being no second terminal to rescue it from.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use salvage_input::{KeyChar, WaitOutcome, keycodes};
use salvage_pty::{OutputEvent, ProcessStatus, ShellConfig, ShellSession};
use salvage_term::DEFAULT_FRONT;
use tracing::{debug, error, info, warn};

use crate::service::Ui;
use crate::state::BackgroundIcon;

/// Set in the shell's environment so scripts can tell they run inside
/// the recovery console.
pub const CONSOLE_ENV_VAR: &str = "SALVAGE_CONSOLE";

/// Blink task poll cadence; the phase itself is the compositor's clock.
const BLINK_POLL: Duration = Duration::from_millis(20);

/// How a console session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutcome {
    /// The shell exited on its own with this code.
    Exited(i32),
    /// The kill chord brought it down.
    ForceQuit,
    /// The shell never started.
    FailedStart,
}

pub(crate) fn run(ui: &Ui, shell: Option<&Path>) -> ConsoleOutcome {
    ui.compositor().set_background(BackgroundIcon::None);
    let geometry = ui.compositor().begin_console();

    let config = match shell {
        Some(path) => ShellConfig::with_shell(path),
        None => ShellConfig::default(),
    }
    .size(geometry.cols, geometry.rows)
    .pixel_size(geometry.pixel_width, geometry.pixel_height)
    .arg("-i")
    .env(CONSOLE_ENV_VAR, "1");

    let mut session = match ShellSession::spawn(&config) {
        Ok(session) => session,
        Err(err) => {
            error!(error = %err, "console shell failed to start");
            leave(ui);
            return ConsoleOutcome::FailedStart;
        }
    };
    info!(pid = session.pid(), "console shell started");
    ui.queue().clear();

    let header_color = ui.compositor().theme().console_header;
    ui.compositor().console_set_front(header_color);
    let header = format!(
        "{}\r\nSalvage {} Console\r\n",
        ui.device_name(),
        env!("CARGO_PKG_VERSION")
    );
    ui.compositor().console_print(header.as_bytes());
    ui.compositor().console_set_front(DEFAULT_FRONT);

    let terminated = Arc::new(AtomicBool::new(false));
    let pump = session.take_output().map(|output| {
        let compositor = Arc::clone(ui.compositor_arc());
        let queue = Arc::clone(ui.queue());
        let led = Arc::clone(ui.led());
        let terminated = Arc::clone(&terminated);
        thread::Builder::new()
            .name("console-pump".into())
            .spawn(move || {
                for event in output {
                    match event {
                        OutputEvent::Data(bytes) => {
                            let effects = compositor.console_print(&bytes);
                            if effects.bells > 0 {
                                led.blink(false);
                            }
                        }
                        OutputEvent::Eof => break,
                        OutputEvent::Err(err) => {
                            warn!(error = %err, "console read failed");
                            break;
                        }
                    }
                }
                terminated.store(true, Ordering::SeqCst);
                queue.wake();
            })
            .expect("spawn console pump")
    });

    let blink = {
        let compositor = Arc::clone(ui.compositor_arc());
        thread::Builder::new()
            .name("console-blink".into())
            .spawn(move || {
                while compositor.console_blink_tick(Instant::now()) {
                    thread::sleep(BLINK_POLL);
                }
            })
            .expect("spawn console blink")
    };

    let mut force_quit = false;
    let outcome = loop {
        if force_quit {
            info!("console force quit");
            if let Err(err) = session.kill() {
                warn!(error = %err, "console kill failed");
            }
            let _ = session.wait();
            break ConsoleOutcome::ForceQuit;
        }

        let wait = ui.queue().wait_key(ui.usb());
        if terminated.load(Ordering::SeqCst) {
            break outcome_from_wait(&mut session);
        }
        let WaitOutcome::Key(code) = wait else {
            continue;
        };

        // both chord keys down and this press is one of them
        if ui.queue().is_pressed(keycodes::KEY_APOSTROPHE)
            && ui.queue().is_pressed(keycodes::KEY_BACKSPACE)
            && (code == keycodes::KEY_APOSTROPHE || code == keycodes::KEY_BACKSPACE)
        {
            force_quit = true;
            continue;
        }

        // select held down turns letters into control bytes
        if ui.queue().is_pressed(keycodes::KEY_REPLY) && code != keycodes::KEY_REPLY {
            match ui.layout().normal_glyph(code) {
                Some(c @ 'a'..='z') => {
                    let ctrl = c as u8 - b'a' + 1;
                    send(&mut session, &[ctrl]);
                }
                _ => debug!(code, "no control mapping for key"),
            }
            continue;
        }

        let shift = ui.queue().is_pressed(keycodes::KEY_LEFTSHIFT)
            || ui.queue().is_pressed(keycodes::KEY_RIGHTSHIFT);
        let alt = ui.queue().is_pressed(keycodes::KEY_LEFTALT)
            || ui.queue().is_pressed(keycodes::KEY_RIGHTALT);
        let mods = ui.latched_modifiers(shift, alt);

        match ui.layout().resolve(code, mods) {
            KeyChar::None => debug!(code, shift, alt, "unhandled console key"),
            KeyChar::Nothing => {}
            KeyChar::ScrollDown => ui.compositor().console_scroll_down(1),
            KeyChar::ScrollUp => ui.compositor().console_scroll_up(1),
            KeyChar::BigScrollDown => ui.compositor().console_scroll_down(10),
            KeyChar::BigScrollUp => ui.compositor().console_scroll_up(10),
            KeyChar::ArrowUp => send(&mut session, b"[A"),
            KeyChar::ArrowDown => send(&mut session, b"[B"),
            KeyChar::ArrowRight => send(&mut session, b"[C"),
            KeyChar::ArrowLeft => send(&mut session, b"[D"),
            KeyChar::CapsLock => ui.toggle_caps_latch(),
            KeyChar::AltLock => ui.toggle_alt_latch(),
            KeyChar::Escape => send(&mut session, b"["),
            KeyChar::Glyph(c) => {
                let mut buf = [0u8; 4];
                let bytes = c.encode_utf8(&mut buf).as_bytes();
                if let Err(err) = session.write_all(bytes) {
                    warn!(error = %err, "console write failed");
                }
            }
        }
    };

    leave(ui);
    if let Some(handle) = pump {
        let _ = handle.join();
    }
    let _ = blink.join();
    debug!(?outcome, "console closed");
    outcome
}

fn send(session: &mut ShellSession, body: &[u8]) {
    if let Err(err) = session.send_escape(body) {
        warn!(error = %err, "console write failed");
    }
}

fn outcome_from_wait(session: &mut ShellSession) -> ConsoleOutcome {
    match session.wait() {
        Ok(ProcessStatus::Exited(code)) => {
            if code != 0 {
                warn!(code, "console shell exited abnormally");
            }
            ConsoleOutcome::Exited(code)
        }
        Ok(status) => {
            warn!(?status, "console shell ended without an exit code");
            ConsoleOutcome::Exited(1)
        }
        Err(err) => {
            warn!(error = %err, "console shell wait failed");
            ConsoleOutcome::Exited(1)
        }
    }
}

/// Latches are session-scoped; both clear on the way out.
fn leave(ui: &Ui) {
    ui.clear_latches();
    ui.compositor().end_console();
}
