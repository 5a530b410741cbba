#![no_main]

use libfuzzer_sys::fuzz_target;
use microspec_gui::device::protocol::{Command, read_reply};
use std::io::Cursor;

const COMMANDS: [Command; 4] = [
    Command::GetExposure,
    Command::CaptureFrame,
    Command::AutoExposure,
    Command::GetAutoExposeConfig,
];

fuzz_target!(|data: &[u8]| {
    // First byte picks the command, the rest is the dev-kit's reply
    let Some((&selector, reply)) = data.split_first() else {
        return;
    };
    let command = COMMANDS[usize::from(selector) % COMMANDS.len()];
    let _ = read_reply(&mut Cursor::new(reply), &command);
});
