//! GUI module
//!
//! Provides the Slint window that paints the spectrum scene and forwards key
//! presses, plus the frame timer that drives the application controller.

pub mod gui_controller;

pub use gui_controller::GuiController;
