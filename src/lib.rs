//! `microspec-gui` - Live spectrum viewer for the Chromation spectrometer dev-kit
//!
//! Plots every frame the dev-kit captures and lets the user adjust the exposure
//! from the keyboard or a gamepad. The dev-kit firmware does the measuring and
//! auto-exposing; this crate issues commands and draws the replies.
//!
//! # Layout
//!
//! - [`device`]: `DevKit` trait, USB serial client and a simulated dev-kit
//! - [`exposure`]: exposure time and the significant-digit stepper
//! - [`plot`]: screen geometry, peak detection and scene composition
//! - [`input`]: keyboard and gamepad bindings
//! - [`controller`]: per-frame application logic
//! - [`config`]: `config.json` loading and saving
//!
//! The window itself lives in the binary.

// Module declarations
pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod exposure;
pub mod input;
pub mod plot;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use error::{MicrospecError, Result};
