//! Per-frame scene composition
//!
//! A `Scene` is the complete drawing for one frame in screen coordinates:
//! reference lines, the data curve, the peak and cursor markers and the text
//! readouts. The GUI only has to paint it.

use crate::device::{AutoExposeResult, FULL_SCALE_COUNTS, PixelRange};
use crate::exposure::Exposure;
use crate::plot::layout::PlotLayout;
use crate::plot::palette::{
    BLACKEST_GRAVEL, DARK_GRAVEL, DEEP_GRAVEL, DIRTY_BLONDE, DRESS, GRAVEL, MEDIUM_GRAVEL, Rgb,
    SALTWATER_TAFFY, TARDIS,
};
use crate::plot::peak::Peak;

/// Default label size in points
const LABEL_PT: u32 = 16;
/// Size of the pixel-number labels under the markers
const MARKER_LABEL_PT: u32 = 14;
/// Size of the peak counts readout
const PEAK_COUNTS_PT: u32 = 20;

/// A point in screen coordinates, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

/// Straight line between two points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Start point
    pub from: Point,
    /// End point
    pub to: Point,
    /// Line color
    pub color: Rgb,
}

/// Connected run of line segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polyline {
    /// Vertices in drawing order
    pub points: Vec<Point>,
    /// Line color
    pub color: Rgb,
}

/// Text anchored at its top-left corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Top-left corner
    pub position: Point,
    /// Text to draw
    pub text: String,
    /// Text color
    pub color: Rgb,
    /// Font size in points
    pub size_pt: u32,
}

/// Everything drawn in one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    /// Window width
    pub width: i32,
    /// Window height
    pub height: i32,
    /// Fill color
    pub background: Rgb,
    /// Reference lines and markers
    pub segments: Vec<Segment>,
    /// Data curve pieces
    pub polylines: Vec<Polyline>,
    /// Text readouts
    pub labels: Vec<Label>,
}

/// Colors of the exposure and auto-expose readouts
///
/// The readout touched by the last command lights up; the other one dims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTones {
    /// Exposure in milliseconds
    pub exposure_ms: Rgb,
    /// Exposure in cycles
    pub exposure_cycles: Rgb,
    /// Auto-expose outcome and iteration count
    pub auto_expose: Rgb,
}

impl Default for LabelTones {
    fn default() -> Self {
        Self {
            exposure_ms: DARK_GRAVEL,
            exposure_cycles: DARK_GRAVEL,
            auto_expose: DARK_GRAVEL,
        }
    }
}

impl LabelTones {
    /// Tones after a manual exposure change
    pub fn after_exposure_step() -> Self {
        Self {
            exposure_ms: SALTWATER_TAFFY,
            exposure_cycles: DIRTY_BLONDE,
            auto_expose: DARK_GRAVEL,
        }
    }

    /// Tones after an auto-expose run
    pub fn after_auto_expose() -> Self {
        Self {
            exposure_ms: SALTWATER_TAFFY,
            exposure_cycles: DIRTY_BLONDE,
            auto_expose: DIRTY_BLONDE,
        }
    }
}

/// Auto-expose band drawn over the plot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdLevels {
    /// Auto-expose target counts
    pub target: u16,
    /// Accepted deviation from the target
    pub tolerance: u16,
    /// Highest counts expected from a dark frame
    pub max_dark: u16,
}

/// State needed to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct PlotView<'a> {
    /// Latest counts, pixel 1 first
    pub counts: &'a [u16],
    /// Meaningful pixel range
    pub range: PixelRange,
    /// Pixel under the cursor line
    pub cursor_pixel: usize,
    /// Peak of `counts` inside `range`
    pub peak: Option<Peak>,
    /// Current exposure
    pub exposure: Exposure,
    /// Outcome of the last auto-expose run
    pub auto_expose: AutoExposeResult,
    /// Readout colors
    pub tones: LabelTones,
    /// Reference levels
    pub levels: ThresholdLevels,
}

/// Build the scene for one frame
pub fn compose(layout: &PlotLayout, view: &PlotView<'_>) -> Scene {
    let (width, height) = layout.window_size();
    let mut scene = Scene {
        width,
        height,
        background: BLACKEST_GRAVEL,
        segments: Vec::with_capacity(8),
        polylines: Vec::with_capacity(3),
        labels: Vec::with_capacity(9),
    };

    add_reference_lines(&mut scene, layout, view.levels);
    add_curve(&mut scene, layout, view.counts, view.range);
    add_readouts(&mut scene, layout, view);
    add_markers(&mut scene, layout, view);

    scene
}

fn add_reference_lines(scene: &mut Scene, layout: &PlotLayout, levels: ThresholdLevels) {
    let (left, right) = layout.data_span();
    let mut horizontal = |counts: u16, color: Rgb| {
        let y = layout.y_for_counts(counts);
        scene.segments.push(Segment {
            from: Point { x: left, y },
            to: Point { x: right, y },
            color,
        });
    };

    horizontal(FULL_SCALE_COUNTS, DARK_GRAVEL);
    horizontal(0, DARK_GRAVEL);
    horizontal(levels.target, DRESS);
    horizontal(levels.target.saturating_add(levels.tolerance), DEEP_GRAVEL);
    horizontal(levels.target.saturating_sub(levels.tolerance), DEEP_GRAVEL);
    horizontal(levels.max_dark, DEEP_GRAVEL);
}

fn add_curve(scene: &mut Scene, layout: &PlotLayout, counts: &[u16], range: PixelRange) {
    let points: Vec<Point> = counts
        .iter()
        .enumerate()
        .map(|(index, &value)| Point {
            x: layout.pixel_to_x(index + 1),
            y: layout.y_for_counts(value),
        })
        .collect();

    let lower_end = usize::from(range.start).saturating_sub(1).min(points.len());
    let upper_start = usize::from(range.stop).clamp(lower_end, points.len());

    for (slice, color) in [
        (&points[..lower_end], MEDIUM_GRAVEL),
        (&points[upper_start..], GRAVEL),
        (&points[lower_end..upper_start], SALTWATER_TAFFY),
    ] {
        // A single point draws nothing
        if slice.len() >= 2 {
            scene.polylines.push(Polyline {
                points: slice.to_vec(),
                color,
            });
        }
    }
}

fn add_readouts(scene: &mut Scene, layout: &PlotLayout, view: &PlotView<'_>) {
    let yax = layout.y_axis_space();
    let right_block = yax + to_i32(layout.frame_len());
    let top = layout.top();
    let mut label = |x: i32, y: i32, text: String, color: Rgb, size_pt: u32| {
        scene.labels.push(Label {
            position: Point { x, y },
            text,
            color,
            size_pt,
        });
    };

    label(
        right_block - 140,
        top + 110,
        "exposure:".to_string(),
        GRAVEL,
        LABEL_PT,
    );
    label(
        right_block - 120,
        top + 130,
        format!("{:.2}ms", view.exposure.as_ms()),
        view.tones.exposure_ms,
        LABEL_PT,
    );
    label(
        right_block - 120,
        top + 150,
        format!("{} cycles", view.exposure.cycles()),
        view.tones.exposure_cycles,
        LABEL_PT,
    );

    let outcome = if view.auto_expose.success {
        "HIT TARGET"
    } else {
        "GAVE UP"
    };
    label(yax + 10, top + 110, "Auto-expose:".to_string(), GRAVEL, LABEL_PT);
    label(
        yax + 30,
        top + 130,
        outcome.to_string(),
        view.tones.auto_expose,
        LABEL_PT,
    );
    label(
        yax + 30,
        top + 150,
        format!("iterations: {}", view.auto_expose.iterations),
        view.tones.auto_expose,
        LABEL_PT,
    );

    let peak_counts = view.peak.map_or(0, |peak| peak.counts);
    label(
        yax + 10,
        top + 190,
        format!("peak: {peak_counts}"),
        SALTWATER_TAFFY,
        PEAK_COUNTS_PT,
    );
}

fn add_markers(scene: &mut Scene, layout: &PlotLayout, view: &PlotView<'_>) {
    let (_, height) = layout.window_size();
    let xax = layout.x_axis_space();

    if let Some(peak) = view.peak {
        let x = layout.pixel_to_x(peak.pixel);
        scene.segments.push(Segment {
            from: Point {
                x,
                y: layout.peak_marker_bottom(),
            },
            to: Point { x, y: layout.top() },
            color: TARDIS,
        });
        scene.labels.push(Label {
            position: Point {
                x: x + 2,
                y: height - xax / 2,
            },
            text: peak.pixel.to_string(),
            color: TARDIS,
            size_pt: MARKER_LABEL_PT,
        });
    }

    let x = layout.pixel_to_x(view.cursor_pixel);
    scene.segments.push(Segment {
        from: Point {
            x,
            y: layout.cursor_marker_bottom(),
        },
        to: Point { x, y: layout.top() },
        color: TARDIS,
    });
    scene.labels.push(Label {
        position: Point {
            x: x + 2,
            y: height - xax,
        },
        text: view.cursor_pixel.to_string(),
        color: TARDIS,
        size_pt: MARKER_LABEL_PT,
    });
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplaySettings;
    use crate::plot::peak::find_peak;
    use crate::test_utils::frame_with_peak;

    const RANGE: PixelRange = PixelRange::new(220, 373);

    fn levels() -> ThresholdLevels {
        ThresholdLevels {
            target: 46420,
            tolerance: 3277,
            max_dark: 4500,
        }
    }

    fn compose_frame(counts: &[u16], tones: LabelTones) -> Scene {
        let layout = PlotLayout::new(&DisplaySettings::default(), counts.len());
        compose(
            &layout,
            &PlotView {
                counts,
                range: RANGE,
                cursor_pixel: 373,
                peak: find_peak(counts, RANGE),
                exposure: Exposure::from_cycles(50),
                auto_expose: AutoExposeResult::default(),
                tones,
                levels: levels(),
            },
        )
    }

    fn label<'a>(scene: &'a Scene, text: &str) -> &'a Label {
        scene
            .labels
            .iter()
            .find(|label| label.text == text)
            .unwrap_or_else(|| panic!("no label {text:?}"))
    }

    #[test]
    fn test_scene_size_and_background() {
        let scene = compose_frame(&vec![0; 392], LabelTones::default());
        assert_eq!((scene.width, scene.height), (532, 360));
        assert_eq!(scene.background, BLACKEST_GRAVEL);
    }

    #[test]
    fn test_reference_lines_span_data() {
        let scene = compose_frame(&vec![0; 392], LabelTones::default());
        let horizontal: Vec<_> = scene
            .segments
            .iter()
            .filter(|segment| segment.from.y == segment.to.y)
            .collect();
        assert_eq!(horizontal.len(), 6);
        assert!(
            horizontal
                .iter()
                .all(|segment| segment.from.x == 40 && segment.to.x == 432)
        );

        let target = horizontal
            .iter()
            .find(|segment| segment.color == DRESS)
            .unwrap();
        assert_eq!(target.from.y, 108);
        assert_eq!(
            horizontal
                .iter()
                .filter(|segment| segment.color == DARK_GRAVEL)
                .map(|segment| segment.from.y)
                .collect::<Vec<_>>(),
            vec![20, 320]
        );
    }

    #[test]
    fn test_curve_is_split_at_range() {
        let scene = compose_frame(&vec![100; 392], LabelTones::default());
        assert_eq!(scene.polylines.len(), 3);

        let lower = &scene.polylines[0];
        let upper = &scene.polylines[1];
        let meaningful = &scene.polylines[2];
        assert_eq!(lower.color, MEDIUM_GRAVEL);
        assert_eq!(lower.points.len(), 219);
        assert_eq!(upper.color, GRAVEL);
        assert_eq!(upper.points.len(), 392 - 373);
        assert_eq!(meaningful.color, SALTWATER_TAFFY);
        assert_eq!(meaningful.points.len(), 154);
        assert_eq!(meaningful.points[0].x, 40 + 392 - 220);
    }

    #[test]
    fn test_peak_marker_and_labels() {
        let counts = frame_with_peak(392, 1000, 300, 40000);
        let scene = compose_frame(&counts, LabelTones::default());

        let peak_line = scene
            .segments
            .iter()
            .find(|segment| segment.color == TARDIS && segment.from.y == 360)
            .unwrap();
        assert_eq!(peak_line.from.x, 40 + 392 - 300);
        assert_eq!(peak_line.to.y, 20);

        assert_eq!(label(&scene, "peak: 40000").size_pt, 20);
        assert_eq!(label(&scene, "300").position, Point { x: 134, y: 340 });
        assert_eq!(label(&scene, "373").position, Point { x: 61, y: 320 });
    }

    #[test]
    fn test_readout_text_and_tones() {
        let scene = compose_frame(&vec![0; 392], LabelTones::default());
        assert_eq!(label(&scene, "1.00ms").color, DARK_GRAVEL);
        assert_eq!(label(&scene, "50 cycles").position, Point { x: 312, y: 170 });
        assert_eq!(label(&scene, "HIT TARGET").color, DARK_GRAVEL);
        assert_eq!(label(&scene, "iterations: 1").position, Point { x: 70, y: 170 });
        assert_eq!(label(&scene, "exposure:").color, GRAVEL);

        let scene = compose_frame(&vec![0; 392], LabelTones::after_auto_expose());
        assert_eq!(label(&scene, "1.00ms").color, SALTWATER_TAFFY);
        assert_eq!(label(&scene, "50 cycles").color, DIRTY_BLONDE);
        assert_eq!(label(&scene, "HIT TARGET").color, DIRTY_BLONDE);
    }

    #[test]
    fn test_short_frame_has_no_peak_marker() {
        let scene = compose_frame(&[7; 100], LabelTones::default());
        assert!(scene.labels.iter().any(|label| label.text == "peak: 0"));
        assert_eq!(scene.polylines.len(), 1);
        assert_eq!(scene.polylines[0].color, MEDIUM_GRAVEL);
    }
}
