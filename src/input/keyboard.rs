//! Keyboard bindings
//!
//! | key            | command                    |
//! |----------------|----------------------------|
//! | `q`, `Esc`     | quit                       |
//! | `a`, space     | auto-expose                |
//! | `x` / `X`      | exposure down / up         |
//! | `h`, `←`       | cursor one pixel left      |
//! | `l`, `→`       | cursor one pixel right     |
//! | `j`, `↓`       | cursor ten pixels left     |
//! | `k`, `↑`       | cursor ten pixels right    |
//! | `0`, `Home`    | shortest wavelength        |
//! | `$`, `End`     | longest wavelength         |

use crate::input::command::{Command, CursorMotion};

/// A key press, independent of the windowing toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyInput {
    /// A key that produces a character, after shift is applied
    Char(char),
    /// Left arrow
    ArrowLeft,
    /// Right arrow
    ArrowRight,
    /// Up arrow
    ArrowUp,
    /// Down arrow
    ArrowDown,
    /// Home
    Home,
    /// End
    End,
    /// Escape
    Escape,
}

/// Command bound to `key`, if any
pub fn command_for_key(key: KeyInput) -> Option<Command> {
    let command = match key {
        KeyInput::Char('q') | KeyInput::Escape => Command::Quit,
        KeyInput::Char('a' | ' ') => Command::AutoExpose,
        KeyInput::Char('x') => Command::DecreaseExposure,
        KeyInput::Char('X') => Command::IncreaseExposure,
        KeyInput::Char('h') | KeyInput::ArrowLeft => Command::MoveCursor(CursorMotion::Left),
        KeyInput::Char('l') | KeyInput::ArrowRight => Command::MoveCursor(CursorMotion::Right),
        KeyInput::Char('j') | KeyInput::ArrowDown => Command::MoveCursor(CursorMotion::JumpLeft),
        KeyInput::Char('k') | KeyInput::ArrowUp => Command::MoveCursor(CursorMotion::JumpRight),
        KeyInput::Char('0') | KeyInput::Home => Command::MoveCursor(CursorMotion::Home),
        KeyInput::Char('$') | KeyInput::End => Command::MoveCursor(CursorMotion::End),
        KeyInput::Char(_) => return None,
    };
    Some(command)
}
