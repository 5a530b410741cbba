//! User input
//!
//! Keyboard and gamepad events are reduced to [`Command`]s before they reach
//! the controller.

pub mod command;
pub mod gamepad;
pub mod keyboard;

pub use command::{CURSOR_JUMP, Command, CursorMotion};
pub use gamepad::{CommandBatch, GamepadMapper, GamepadReader, command_for_button};
pub use keyboard::{KeyInput, command_for_key};
