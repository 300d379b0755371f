//! Keyboard layouts: three translation layers per layout, looked up by name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::keycodes::{KEY_SLOTS, RawKey};

bitflags::bitflags! {
    /// Modifier state at resolve time. Held modifiers and latches combine;
    /// the alternate layer wins over the shifted one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const ALT = 1 << 1;
        const CAPS_LATCH = 1 << 2;
        const ALT_LATCH = 1 << 3;
    }
}

/// What a key resolves to under a layout layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyChar {
    /// Not mapped in this layer.
    #[default]
    None,
    /// Mapped, but produces nothing (modifiers, chord keys).
    Nothing,
    /// A literal byte for the pty or text buffer. Includes `\n`, `\t`, `\b`.
    Glyph(char),
    ScrollUp,
    ScrollDown,
    BigScrollUp,
    BigScrollDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    CapsLock,
    AltLock,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Normal,
    Shifted,
    Alternate,
}

/// One keyboard layout: normal, shifted, and alternate tables indexed by
/// raw key code.
pub struct KeyboardLayout {
    normal: Box<[KeyChar]>,
    shifted: Box<[KeyChar]>,
    alternate: Box<[KeyChar]>,
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::empty()
    }
}

impl KeyboardLayout {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            normal: vec![KeyChar::None; KEY_SLOTS].into_boxed_slice(),
            shifted: vec![KeyChar::None; KEY_SLOTS].into_boxed_slice(),
            alternate: vec![KeyChar::None; KEY_SLOTS].into_boxed_slice(),
        }
    }

    pub fn set(&mut self, layer: Layer, code: RawKey, ch: KeyChar) {
        if (code as usize) < KEY_SLOTS {
            let table = match layer {
                Layer::Normal => &mut self.normal,
                Layer::Shifted => &mut self.shifted,
                Layer::Alternate => &mut self.alternate,
            };
            table[code as usize] = ch;
        }
    }

    /// Maps `code` to a pair of glyphs on the normal and shifted layers.
    pub fn glyphs(&mut self, code: RawKey, normal: char, shifted: char) {
        self.set(Layer::Normal, code, KeyChar::Glyph(normal));
        self.set(Layer::Shifted, code, KeyChar::Glyph(shifted));
    }

    /// Maps `code` to the same special on the normal and shifted layers.
    pub fn special(&mut self, code: RawKey, ch: KeyChar) {
        self.set(Layer::Normal, code, ch);
        self.set(Layer::Shifted, code, ch);
    }

    #[must_use]
    pub fn resolve(&self, code: RawKey, mods: Modifiers) -> KeyChar {
        if code as usize >= KEY_SLOTS {
            return KeyChar::None;
        }
        let table = if mods.intersects(Modifiers::ALT | Modifiers::ALT_LATCH) {
            &self.alternate
        } else if mods.intersects(Modifiers::SHIFT | Modifiers::CAPS_LATCH) {
            &self.shifted
        } else {
            &self.normal
        };
        table[code as usize]
    }

    /// The unmodified glyph for a key, if it has one. Control-chord
    /// synthesis uses this.
    #[must_use]
    pub fn normal_glyph(&self, code: RawKey) -> Option<char> {
        match self.resolve(code, Modifiers::empty()) {
            KeyChar::Glyph(c) => Some(c),
            _ => None,
        }
    }
}

/// Named layouts. Device profiles reference layouts by name so several
/// profiles can share one.
#[derive(Default)]
pub struct LayoutRegistry {
    layouts: HashMap<String, Arc<KeyboardLayout>>,
}

impl LayoutRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in layouts.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register(crate::qwerty::LAYOUT_NAME, crate::qwerty::slider_layout());
        reg
    }

    pub fn register(&mut self, name: impl Into<String>, layout: KeyboardLayout) {
        self.layouts.insert(name.into(), Arc::new(layout));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<KeyboardLayout>> {
        self.layouts.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycodes::{KEY_A, KEY_Q};

    #[test]
    fn latches_select_layers_like_held_modifiers() {
        let mut layout = KeyboardLayout::empty();
        layout.glyphs(KEY_A, 'a', 'A');
        layout.set(Layer::Alternate, KEY_A, KeyChar::Glyph('@'));

        assert_eq!(layout.resolve(KEY_A, Modifiers::empty()), KeyChar::Glyph('a'));
        assert_eq!(layout.resolve(KEY_A, Modifiers::SHIFT), KeyChar::Glyph('A'));
        assert_eq!(layout.resolve(KEY_A, Modifiers::CAPS_LATCH), KeyChar::Glyph('A'));
        assert_eq!(layout.resolve(KEY_A, Modifiers::ALT_LATCH), KeyChar::Glyph('@'));
    }

    #[test]
    fn alt_wins_over_shift() {
        let mut layout = KeyboardLayout::empty();
        layout.glyphs(KEY_A, 'a', 'A');
        layout.set(Layer::Alternate, KEY_A, KeyChar::Glyph('@'));
        let mods = Modifiers::SHIFT | Modifiers::ALT;
        assert_eq!(layout.resolve(KEY_A, mods), KeyChar::Glyph('@'));
    }

    #[test]
    fn registry_lookup_by_name() {
        let reg = LayoutRegistry::with_builtins();
        let layout = reg.get(crate::qwerty::LAYOUT_NAME).unwrap();
        assert_eq!(layout.resolve(KEY_Q, Modifiers::empty()), KeyChar::Glyph('q'));
        assert!(reg.get("dvorak").is_none());
    }
}
