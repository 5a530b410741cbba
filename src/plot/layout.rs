//! Screen geometry of the spectrum plot
//!
//! One screen column per pixel. Pixel numbers run right to left so the
//! shortest wavelength sits at the left edge of the plot:
//!
//! ```text
//! x = y_axis_space + frame_len - pixel
//! y = plot_height + margin - round(plot_height * counts / 65535)
//! ```

use crate::config::DisplaySettings;
use crate::device::FULL_SCALE_COUNTS;

/// Extra width right of the data span
const RIGHT_PADDING: i32 = 100;

/// Geometry of one plot window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotLayout {
    frame_len: i32,
    plot_height: i32,
    margin: i32,
    x_axis_space: i32,
    y_axis_space: i32,
}

impl PlotLayout {
    /// Layout for frames of `frame_len` pixels
    pub fn new(display: &DisplaySettings, frame_len: usize) -> Self {
        Self {
            frame_len: to_coord(frame_len),
            plot_height: to_coord(display.plot_height),
            margin: to_coord(display.margin),
            x_axis_space: to_coord(display.x_axis_space),
            y_axis_space: to_coord(display.y_axis_space),
        }
    }

    /// Frame length the layout was built for
    pub fn frame_len(&self) -> usize {
        usize::try_from(self.frame_len).unwrap_or(0)
    }

    /// Window `(width, height)` in screen pixels
    pub fn window_size(&self) -> (i32, i32) {
        (
            self.y_axis_space + self.frame_len + RIGHT_PADDING,
            self.x_axis_space + self.plot_height + self.margin,
        )
    }

    /// Screen x of 1-based `pixel`
    pub fn pixel_to_x(&self, pixel: usize) -> i32 {
        self.y_axis_space + self.frame_len - to_coord(pixel)
    }

    /// Pixel number drawn at screen column `x`, if `x` is inside the data span
    pub fn x_to_pixel(&self, x: i32) -> Option<usize> {
        let pixel = self.y_axis_space + self.frame_len - x;
        if (1..=self.frame_len).contains(&pixel) {
            usize::try_from(pixel).ok()
        } else {
            None
        }
    }

    /// Screen y of a reading of `counts`
    #[expect(
        clippy::cast_possible_truncation,
        reason = "scaled counts never exceed plot_height"
    )]
    pub fn y_for_counts(&self, counts: u16) -> i32 {
        let scaled = f64::from(self.plot_height) * f64::from(counts) / f64::from(FULL_SCALE_COUNTS);
        self.baseline() - scaled.round() as i32
    }

    /// Screen y of zero counts
    pub fn baseline(&self) -> i32 {
        self.plot_height + self.margin
    }

    /// Screen y of full scale
    pub fn top(&self) -> i32 {
        self.margin
    }

    /// Left and right end of the horizontal reference lines
    pub fn data_span(&self) -> (i32, i32) {
        (self.y_axis_space, self.y_axis_space + self.frame_len)
    }

    /// Bottom end of the peak marker, in the axis strip below the plot
    pub fn peak_marker_bottom(&self) -> i32 {
        self.baseline() + self.x_axis_space
    }

    /// Bottom end of the cursor line, half way into the axis strip
    pub fn cursor_marker_bottom(&self) -> i32 {
        self.baseline() + self.x_axis_space / 2
    }

    /// Width of the y-axis strip
    pub fn y_axis_space(&self) -> i32 {
        self.y_axis_space
    }

    /// Height of the x-axis strip
    pub fn x_axis_space(&self) -> i32 {
        self.x_axis_space
    }
}

fn to_coord<T: TryInto<i32>>(value: T) -> i32 {
    value.try_into().unwrap_or(i32::MAX / 4)
}
