//! Semantic viewer commands
//!
//! Keyboard and gamepad input both reduce to these. Cursor motions are named
//! by their on-screen direction; pixel numbers grow to the left of the plot.

use crate::device::PixelRange;

/// Pixels moved by a coarse cursor step
pub const CURSOR_JUMP: usize = 10;

/// Cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorMotion {
    /// One pixel left (next higher pixel)
    Left,
    /// One pixel right (next lower pixel)
    Right,
    /// [`CURSOR_JUMP`] pixels left
    JumpLeft,
    /// [`CURSOR_JUMP`] pixels right
    JumpRight,
    /// Left end of the meaningful range, the shortest wavelength
    Home,
    /// Right end of the meaningful range, the longest wavelength
    End,
}

impl CursorMotion {
    /// Pixel the cursor lands on when moved from `pixel`, kept inside `range`
    pub fn apply(self, pixel: usize, range: PixelRange) -> usize {
        let moved = match self {
            Self::Left => pixel.saturating_add(1),
            Self::Right => pixel.saturating_sub(1),
            Self::JumpLeft => pixel.saturating_add(CURSOR_JUMP),
            Self::JumpRight => pixel.saturating_sub(CURSOR_JUMP),
            Self::Home => usize::from(range.stop),
            Self::End => usize::from(range.start),
        };
        range.clamp(moved)
    }
}

/// Something the user asked the viewer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Close the viewer
    Quit,
    /// Run the firmware auto-expose loop
    AutoExpose,
    /// Step the exposure time up one significant digit
    IncreaseExposure,
    /// Step the exposure time down one significant digit
    DecreaseExposure,
    /// Move the inspection cursor
    MoveCursor(CursorMotion),
}
