//! Gamepad bindings
//!
//! Laid out for an XInput (Xbox 360 style) controller; events from every
//! connected pad are accepted.
//!
//! | input                      | command                 |
//! |----------------------------|-------------------------|
//! | Back / Select              | quit                    |
//! | A                          | auto-expose             |
//! | X / Y                      | exposure down / up      |
//! | right stick X, full tilt   | cursor one pixel        |
//! | left stick X, full tilt    | cursor ten pixels       |
//! | left trigger               | shortest wavelength     |
//! | right trigger              | longest wavelength      |
//!
//! A stick fires once when it reaches full deflection and again only after it
//! has come back.

use crate::input::command::{Command, CursorMotion};
use gilrs::{Axis, Button, EventType, Gilrs};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

/// Stick position treated as full deflection
pub const FULL_DEFLECTION: f32 = 0.95;

/// Commands gathered in one poll
pub type CommandBatch = SmallVec<[Command; 4]>;

/// Direction of a fully deflected stick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deflection {
    Negative,
    Positive,
}

impl Deflection {
    fn of(value: f32) -> Option<Self> {
        if value <= -FULL_DEFLECTION {
            Some(Self::Negative)
        } else if value >= FULL_DEFLECTION {
            Some(Self::Positive)
        } else {
            None
        }
    }
}

/// Command bound to a button press
pub fn command_for_button(button: Button) -> Option<Command> {
    match button {
        Button::Select => Some(Command::Quit),
        Button::South => Some(Command::AutoExpose),
        Button::West => Some(Command::DecreaseExposure),
        Button::North => Some(Command::IncreaseExposure),
        Button::LeftTrigger2 => Some(Command::MoveCursor(CursorMotion::Home)),
        Button::RightTrigger2 => Some(Command::MoveCursor(CursorMotion::End)),
        _ => None,
    }
}

fn command_for_deflection(axis: Axis, deflection: Deflection) -> Option<Command> {
    let motion = match (axis, deflection) {
        (Axis::RightStickX, Deflection::Negative) => CursorMotion::Left,
        (Axis::RightStickX, Deflection::Positive) => CursorMotion::Right,
        (Axis::LeftStickX, Deflection::Negative) => CursorMotion::JumpLeft,
        (Axis::LeftStickX, Deflection::Positive) => CursorMotion::JumpRight,
        _ => return None,
    };
    Some(Command::MoveCursor(motion))
}

/// Turns gamepad events into commands, tracking stick deflection
#[derive(Debug, Default)]
pub struct GamepadMapper {
    right_stick: Option<Deflection>,
    left_stick: Option<Deflection>,
}

impl GamepadMapper {
    /// Command for a stick moving to `value`, fired on reaching full deflection
    pub fn map_axis(&mut self, axis: Axis, value: f32) -> Option<Command> {
        let slot = match axis {
            Axis::RightStickX => &mut self.right_stick,
            Axis::LeftStickX => &mut self.left_stick,
            _ => return None,
        };
        let deflection = Deflection::of(value);
        let previous = std::mem::replace(slot, deflection);
        if deflection == previous {
            return None;
        }
        deflection.and_then(|d| command_for_deflection(axis, d))
    }

    /// Command for any gamepad event
    pub fn map_event(&mut self, event: &EventType) -> Option<Command> {
        match *event {
            EventType::ButtonPressed(button, _) => command_for_button(button),
            EventType::AxisChanged(axis, value, _) => self.map_axis(axis, value),
            _ => None,
        }
    }
}

/// Polls connected gamepads
///
/// Without gamepad support on the platform every poll comes back empty.
pub struct GamepadReader {
    gilrs: Option<Gilrs>,
    mapper: GamepadMapper,
}

impl GamepadReader {
    /// Start listening for gamepads
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => {
                for (_, gamepad) in gilrs.gamepads() {
                    info!("Gamepad found: {}", gamepad.name());
                }
                Some(gilrs)
            }
            Err(e) => {
                warn!("Gamepad input unavailable: {}", e);
                None
            }
        };
        Self {
            gilrs,
            mapper: GamepadMapper::default(),
        }
    }

    /// Drain pending events and return the commands they map to
    pub fn poll(&mut self) -> CommandBatch {
        let mut commands = CommandBatch::new();
        let Some(gilrs) = self.gilrs.as_mut() else {
            return commands;
        };

        while let Some(event) = gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    info!("Gamepad connected: {}", gilrs.gamepad(event.id).name());
                }
                EventType::Disconnected => {
                    info!("Gamepad disconnected: {}", gilrs.gamepad(event.id).name());
                }
                ref other => {
                    if let Some(command) = self.mapper.map_event(other) {
                        debug!("Gamepad {:?} -> {:?}", other, command);
                        commands.push(command);
                    }
                }
            }
        }
        commands
    }
}

impl Default for GamepadReader {
    fn default() -> Self {
        Self::new()
    }
}
