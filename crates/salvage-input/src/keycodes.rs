//! Linux evdev key codes used by the built-in layouts and the menu engine.

/// Raw evdev key code.
pub type RawKey = u16;

/// Size of the pressed-key table. Codes at or above this are discarded.
pub const KEY_SLOTS: usize = 0x300;

pub const KEY_ESC: RawKey = 1;
pub const KEY_1: RawKey = 2;
pub const KEY_2: RawKey = 3;
pub const KEY_3: RawKey = 4;
pub const KEY_4: RawKey = 5;
pub const KEY_5: RawKey = 6;
pub const KEY_6: RawKey = 7;
pub const KEY_7: RawKey = 8;
pub const KEY_8: RawKey = 9;
pub const KEY_9: RawKey = 10;
pub const KEY_0: RawKey = 11;
pub const KEY_MINUS: RawKey = 12;
pub const KEY_EQUAL: RawKey = 13;
pub const KEY_BACKSPACE: RawKey = 14;
pub const KEY_TAB: RawKey = 15;
pub const KEY_Q: RawKey = 16;
pub const KEY_W: RawKey = 17;
pub const KEY_E: RawKey = 18;
pub const KEY_R: RawKey = 19;
pub const KEY_T: RawKey = 20;
pub const KEY_Y: RawKey = 21;
pub const KEY_U: RawKey = 22;
pub const KEY_I: RawKey = 23;
pub const KEY_O: RawKey = 24;
pub const KEY_P: RawKey = 25;
pub const KEY_ENTER: RawKey = 28;
pub const KEY_A: RawKey = 30;
pub const KEY_S: RawKey = 31;
pub const KEY_D: RawKey = 32;
pub const KEY_F: RawKey = 33;
pub const KEY_G: RawKey = 34;
pub const KEY_H: RawKey = 35;
pub const KEY_J: RawKey = 36;
pub const KEY_K: RawKey = 37;
pub const KEY_L: RawKey = 38;
pub const KEY_SEMICOLON: RawKey = 39;
pub const KEY_APOSTROPHE: RawKey = 40;
pub const KEY_GRAVE: RawKey = 41;
pub const KEY_LEFTSHIFT: RawKey = 42;
pub const KEY_Z: RawKey = 44;
pub const KEY_X: RawKey = 45;
pub const KEY_C: RawKey = 46;
pub const KEY_V: RawKey = 47;
pub const KEY_B: RawKey = 48;
pub const KEY_N: RawKey = 49;
pub const KEY_M: RawKey = 50;
pub const KEY_COMMA: RawKey = 51;
pub const KEY_DOT: RawKey = 52;
pub const KEY_SLASH: RawKey = 53;
pub const KEY_RIGHTSHIFT: RawKey = 54;
pub const KEY_LEFTALT: RawKey = 56;
pub const KEY_SPACE: RawKey = 57;
pub const KEY_CAPSLOCK: RawKey = 58;
pub const KEY_RIGHTALT: RawKey = 100;
pub const KEY_UP: RawKey = 103;
pub const KEY_LEFT: RawKey = 105;
pub const KEY_RIGHT: RawKey = 106;
pub const KEY_DOWN: RawKey = 108;
pub const KEY_VOLUMEDOWN: RawKey = 114;
pub const KEY_VOLUMEUP: RawKey = 115;
pub const KEY_CAMERA: RawKey = 212;
pub const KEY_REPLY: RawKey = 232;
