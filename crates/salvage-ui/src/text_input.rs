//! The modal text prompt.
//!
//! A bordered field over a dimmed background. Accepts letters, digits,
//! dashes, and spaces up to the field width; backspace edits, enter
//! commits. Shift and the caps latch pick the shifted layer, the alt
//! layer stays out of reach here. Every edit repaints, even a no-op
//! edit at the field boundary, so the user always sees a reaction.

use salvage_input::{KeyChar, Modifiers, WaitOutcome, keycodes};
use tracing::trace;

use crate::service::Ui;
use crate::state::USER_INPUT_TEXT_MAX;

fn accepts(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == ' '
}

/// Runs the prompt until enter. Returns the typed line, possibly
/// empty. The caps latch is cleared on the way out.
pub(crate) fn run(ui: &Ui, header: &str) -> String {
    ui.compositor().begin_text_input(header);
    let mut typed = String::new();
    loop {
        let code = match ui.queue().wait_key(ui.usb()) {
            WaitOutcome::Key(code) => code,
            WaitOutcome::TimedOut | WaitOutcome::Interrupted => continue,
        };
        let mut mods = Modifiers::empty();
        if ui.queue().is_pressed(keycodes::KEY_LEFTSHIFT)
            || ui.queue().is_pressed(keycodes::KEY_RIGHTSHIFT)
        {
            mods |= Modifiers::SHIFT;
        }
        if ui.caps_latched() {
            mods |= Modifiers::CAPS_LATCH;
        }
        match ui.layout().resolve(code, mods) {
            KeyChar::CapsLock => ui.toggle_caps_latch(),
            KeyChar::Glyph('\n') => break,
            KeyChar::Glyph('\u{8}') => {
                typed.pop();
                ui.compositor().set_input_text(&typed);
            }
            KeyChar::Glyph(c) if accepts(c) => {
                if typed.len() < USER_INPUT_TEXT_MAX {
                    typed.push(c);
                }
                ui.compositor().set_input_text(&typed);
            }
            other => trace!(code, ?other, "ignored in text input"),
        }
    }
    if ui.caps_latched() {
        ui.toggle_caps_latch();
    }
    ui.compositor().end_text_input();
    typed
}
