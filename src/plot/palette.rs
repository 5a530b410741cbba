//! Badwolf color scheme
//!
//! Color names follow Steve Losh's Badwolf palette.

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Color from a `0xRRGGBB` literal
    #[expect(
        clippy::cast_possible_truncation,
        reason = "each channel is masked to 8 bits before the cast"
    )]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: (hex >> 16 & 0xFF) as u8,
            g: (hex >> 8 & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

/// Window background
pub const BLACKEST_GRAVEL: Rgb = Rgb::from_hex(0x14_1413);
/// Full-scale lines and inactive values
pub const DARK_GRAVEL: Rgb = Rgb::from_hex(0x24_2321);
/// Tolerance band and dark level lines
pub const DEEP_GRAVEL: Rgb = Rgb::from_hex(0x45_413b);
/// Curve below the meaningful range
pub const MEDIUM_GRAVEL: Rgb = Rgb::from_hex(0x66_6462);
/// Curve above the meaningful range, label titles
pub const GRAVEL: Rgb = Rgb::from_hex(0x85_7f78);
/// Auto-expose target line
pub const DRESS: Rgb = Rgb::from_hex(0xff_9eb8);
/// Curve over the meaningful range, highlighted values
pub const SALTWATER_TAFFY: Rgb = Rgb::from_hex(0x8c_ffba);
/// Peak and cursor markers
pub const TARDIS: Rgb = Rgb::from_hex(0x0a_9dff);
/// Highlighted secondary values
pub const DIRTY_BLONDE: Rgb = Rgb::from_hex(0xf4_cf86);
