//! UI colors.

use salvage_render::{Rgb, Rgba};

/// The fixed palette of the recovery screens. One instance is shared by
/// every draw routine; devices that want different branding construct
/// their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Translucent wash drawn over the icon layer before text.
    pub background: Rgba,
    /// Title block rows at the top of the menu.
    pub title: Rgb,
    /// Menu header rows, unselected items, separator rule, scrollbar
    /// track, and the input-box border.
    pub menu: Rgb,
    /// The highlighted menu item and the scrollbar thumb.
    pub menu_selected: Rgb,
    /// The log text under the menu and typed text in the input box.
    pub script: Rgb,
    /// Notification LED color while on or blinking.
    pub led: Rgb,
    /// Console session header lines.
    pub console_header: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba::new(0, 0, 0, 160),
            title: Rgb::new(255, 55, 5),
            menu: Rgb::new(255, 55, 5),
            menu_selected: Rgb::WHITE,
            script: Rgb::new(255, 255, 0),
            led: Rgb::new(255, 0, 0),
            console_header: Rgb::new(255, 255, 0),
        }
    }
}
