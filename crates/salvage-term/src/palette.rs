//! The sixteen-color terminal palette.
//!
//! Values follow the xterm defaults: the dim eight use 205-level
//! channels, the bright eight saturate to 255, and default text is the
//! slightly-off-white 229 gray.

use salvage_render::Rgb;

/// Default foreground, selected by SGR 0 and SGR 39.
pub const DEFAULT_FRONT: Rgb = Rgb::new(229, 229, 229);

/// Dim colors 0-7 (SGR 30-37) followed by bright colors 8-15 (SGR 90-97).
pub const ANSI_PALETTE: [Rgb; 16] = [
    Rgb::new(0, 0, 0),
    Rgb::new(205, 0, 0),
    Rgb::new(0, 205, 0),
    Rgb::new(205, 205, 0),
    Rgb::new(0, 0, 238),
    Rgb::new(205, 0, 205),
    Rgb::new(0, 205, 205),
    Rgb::new(229, 229, 229),
    Rgb::new(127, 127, 127),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(92, 91, 255),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 255, 255),
];

/// Looks up the palette entry for an SGR foreground parameter.
///
/// Covers the dim range 30-37 and the bright range 90-97, both ends
/// inclusive. Everything else, including the background ranges, returns
/// `None`.
#[must_use]
pub fn indexed(param: u32) -> Option<Rgb> {
    match param {
        30..=37 => Some(ANSI_PALETTE[(param - 30) as usize]),
        90..=97 => Some(ANSI_PALETTE[(param - 90 + 8) as usize]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_and_bright_ranges_are_inclusive() {
        assert_eq!(indexed(30), Some(Rgb::new(0, 0, 0)));
        assert_eq!(indexed(37), Some(Rgb::new(229, 229, 229)));
        assert_eq!(indexed(90), Some(Rgb::new(127, 127, 127)));
        assert_eq!(indexed(97), Some(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn background_and_reset_parameters_are_not_palette_entries() {
        assert_eq!(indexed(0), None);
        assert_eq!(indexed(39), None);
        assert_eq!(indexed(40), None);
        assert_eq!(indexed(98), None);
    }
}
