//! Spectrum plot geometry and scene composition
//!
//! Pure functions from the latest frame and the viewer state to a `Scene` in
//! screen coordinates. Nothing here touches the device or the window.

pub mod layout;
pub mod palette;
pub mod peak;
pub mod scene;

pub use layout::PlotLayout;
pub use palette::Rgb;
pub use peak::{Peak, find_peak};
pub use scene::{
    Label, LabelTones, PlotView, Point, Polyline, Scene, Segment, ThresholdLevels, compose,
};
