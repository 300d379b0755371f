//! Built-in layout for slider phones with a landscape QWERTY keypad.
//!
//! The panel is portrait but the keyboard is used in landscape, so the
//! arrow cluster is rotated a quarter turn: the key labelled "up" points
//! left in keyboard orientation, and so on. Volume keys scroll, and turn
//! into ten-row jumps when shifted. The alternate layer is left empty; the
//! hardware has no Fn legends.

use crate::keycodes::*;
use crate::layout::{KeyChar, KeyboardLayout, Layer};

pub const LAYOUT_NAME: &str = "qwerty-slider";

const LETTERS: [(RawKey, char); 26] = [
    (KEY_A, 'a'),
    (KEY_B, 'b'),
    (KEY_C, 'c'),
    (KEY_D, 'd'),
    (KEY_E, 'e'),
    (KEY_F, 'f'),
    (KEY_G, 'g'),
    (KEY_H, 'h'),
    (KEY_I, 'i'),
    (KEY_J, 'j'),
    (KEY_K, 'k'),
    (KEY_L, 'l'),
    (KEY_M, 'm'),
    (KEY_N, 'n'),
    (KEY_O, 'o'),
    (KEY_P, 'p'),
    (KEY_Q, 'q'),
    (KEY_R, 'r'),
    (KEY_S, 's'),
    (KEY_T, 't'),
    (KEY_U, 'u'),
    (KEY_V, 'v'),
    (KEY_W, 'w'),
    (KEY_X, 'x'),
    (KEY_Y, 'y'),
    (KEY_Z, 'z'),
];

const DIGITS: [(RawKey, char, char); 10] = [
    (KEY_1, '1', '!'),
    (KEY_2, '2', '@'),
    (KEY_3, '3', '#'),
    (KEY_4, '4', '$'),
    (KEY_5, '5', '%'),
    (KEY_6, '6', '^'),
    (KEY_7, '7', '&'),
    (KEY_8, '8', '*'),
    (KEY_9, '9', '('),
    (KEY_0, '0', ')'),
];

#[must_use]
pub fn slider_layout() -> KeyboardLayout {
    let mut l = KeyboardLayout::empty();

    for (code, ch) in LETTERS {
        l.glyphs(code, ch, ch.to_ascii_uppercase());
    }
    for (code, normal, shifted) in DIGITS {
        l.glyphs(code, normal, shifted);
    }

    l.glyphs(KEY_DOT, '.', ':');
    l.glyphs(KEY_COMMA, ',', ';');
    l.glyphs(KEY_SLASH, '/', '?');
    l.glyphs(KEY_GRAVE, '\'', '"');
    l.glyphs(KEY_MINUS, '-', '_');
    l.glyphs(KEY_EQUAL, '=', '+');
    l.glyphs(KEY_TAB, '\t', '\t');
    l.glyphs(KEY_SPACE, ' ', ' ');
    l.glyphs(KEY_ENTER, '\n', '\n');
    l.glyphs(KEY_BACKSPACE, '\u{8}', '\u{8}');

    // Rotated arrow cluster; shifted arrows type the symbols printed on
    // the keys.
    l.set(Layer::Normal, KEY_UP, KeyChar::ArrowLeft);
    l.set(Layer::Shifted, KEY_UP, KeyChar::Glyph('<'));
    l.set(Layer::Normal, KEY_LEFT, KeyChar::ArrowDown);
    l.set(Layer::Shifted, KEY_LEFT, KeyChar::Glyph('|'));
    l.set(Layer::Normal, KEY_RIGHT, KeyChar::ArrowUp);
    l.set(Layer::Shifted, KEY_RIGHT, KeyChar::Glyph('~'));
    l.set(Layer::Normal, KEY_DOWN, KeyChar::ArrowRight);
    l.set(Layer::Shifted, KEY_DOWN, KeyChar::Glyph('>'));

    l.set(Layer::Normal, KEY_VOLUMEDOWN, KeyChar::ScrollDown);
    l.set(Layer::Shifted, KEY_VOLUMEDOWN, KeyChar::BigScrollDown);
    l.set(Layer::Normal, KEY_VOLUMEUP, KeyChar::ScrollUp);
    l.set(Layer::Shifted, KEY_VOLUMEUP, KeyChar::BigScrollUp);

    l.special(KEY_CAPSLOCK, KeyChar::CapsLock);
    l.special(KEY_LEFTSHIFT, KeyChar::Nothing);
    l.special(KEY_RIGHTSHIFT, KeyChar::Nothing);
    l.special(KEY_REPLY, KeyChar::Nothing);
    l.special(KEY_APOSTROPHE, KeyChar::Nothing);
    l.special(KEY_CAMERA, KeyChar::Nothing);

    l
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Modifiers;

    #[test]
    fn letters_shift_to_uppercase() {
        let l = slider_layout();
        assert_eq!(l.resolve(KEY_G, Modifiers::empty()), KeyChar::Glyph('g'));
        assert_eq!(l.resolve(KEY_G, Modifiers::SHIFT), KeyChar::Glyph('G'));
    }

    #[test]
    fn arrow_cluster_is_rotated_for_landscape() {
        let l = slider_layout();
        assert_eq!(l.resolve(KEY_UP, Modifiers::empty()), KeyChar::ArrowLeft);
        assert_eq!(l.resolve(KEY_LEFT, Modifiers::empty()), KeyChar::ArrowDown);
        assert_eq!(l.resolve(KEY_RIGHT, Modifiers::empty()), KeyChar::ArrowUp);
        assert_eq!(l.resolve(KEY_DOWN, Modifiers::empty()), KeyChar::ArrowRight);
    }

    #[test]
    fn shifted_volume_keys_jump_by_pages() {
        let l = slider_layout();
        assert_eq!(l.resolve(KEY_VOLUMEUP, Modifiers::empty()), KeyChar::ScrollUp);
        assert_eq!(l.resolve(KEY_VOLUMEUP, Modifiers::SHIFT), KeyChar::BigScrollUp);
        assert_eq!(l.resolve(KEY_VOLUMEDOWN, Modifiers::SHIFT), KeyChar::BigScrollDown);
    }

    #[test]
    fn alternate_layer_is_unmapped() {
        let l = slider_layout();
        assert_eq!(l.resolve(KEY_G, Modifiers::ALT), KeyChar::None);
    }

    #[test]
    fn chord_keys_produce_nothing() {
        let l = slider_layout();
        assert_eq!(l.resolve(KEY_REPLY, Modifiers::empty()), KeyChar::Nothing);
        assert_eq!(l.resolve(KEY_APOSTROPHE, Modifiers::SHIFT), KeyChar::Nothing);
    }
}
