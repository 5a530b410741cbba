//! Application logic controller module
//!
//! # Overview
//!
//! The application controller is the single owner of the viewer state:
//! - **Applies commands** from the keyboard and gamepad to the dev-kit or the cursor
//! - **Captures frames**, keeping the previous data when a frame is dropped
//! - **Finds the peak** of the meaningful pixel range
//! - **Composes the scene** the GUI paints
//!
//! # Frame Flow
//!
//! ```text
//! keys / gamepad → Command → AppController → DevKit
//!                                 ↓
//!                               Scene → GUI
//! ```
//!
//! Everything runs on the GUI thread; each device call blocks until the
//! dev-kit replies.

pub mod app_controller;

pub use app_controller::AppController;
