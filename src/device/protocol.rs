//! Dev-kit command and reply framing
//!
//! Every command is a single id byte followed by its parameters, multi-byte
//! values big-endian. The USB bridge answers every command with a one-byte
//! status. Commands the bridge forwards to the sensor board get a second reply
//! from the sensor: a status byte followed by the command's payload.
//!
//! ```text
//! host   -> [id][params...]
//! bridge <- [status]
//! sensor <- [status][payload...]        (sensor commands only)
//! ```
//!
//! `CaptureFrame` payloads are variable length: a `u16` pixel count followed
//! by that many `u16` pixel values.

use crate::device::kit::{
    AutoExposeConfig, AutoExposeResult, Frame, LedState, PixelRange, SensorConfig,
};
use crate::error::{MicrospecError, Result};
use crate::exposure::Exposure;
use smallvec::SmallVec;
use std::io::{self, Read};

/// Status byte for a successful command
pub const STATUS_OK: u8 = 0;

/// Largest pixel count any binning mode produces
pub const MAX_FRAME_PIXELS: usize = 784;

/// Encoded command bytes; the longest command is 12 bytes
pub type CommandBytes = SmallVec<[u8; 12]>;

/// A command sent to the dev-kit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Set a bridge-board LED
    SetBridgeLed {
        /// LED number
        led: u8,
        /// New setting
        state: LedState,
    },
    /// Set a sensor-board LED
    SetSensorLed {
        /// LED number
        led: u8,
        /// New setting
        state: LedState,
    },
    /// Configure binning, gain and rows
    SetSensorConfig(SensorConfig),
    /// Read the exposure time
    GetExposure,
    /// Write the exposure time
    SetExposure(Exposure),
    /// Capture one frame
    CaptureFrame,
    /// Run the auto-expose loop
    AutoExposure,
    /// Read the auto-expose configuration
    GetAutoExposeConfig,
    /// Write the auto-expose configuration
    SetAutoExposeConfig(AutoExposeConfig),
}

/// Decoded reply payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Status-only reply
    Done,
    /// Reply to `GetExposure`
    Exposure(Exposure),
    /// Reply to `CaptureFrame`
    Frame(Frame),
    /// Reply to `AutoExposure`
    AutoExpose(AutoExposeResult),
    /// Reply to `GetAutoExposeConfig`
    AutoExposeConfig(AutoExposeConfig),
}

impl Command {
    /// Command id byte
    pub fn id(&self) -> u8 {
        match self {
            Self::SetBridgeLed { .. } => 2,
            Self::SetSensorLed { .. } => 4,
            Self::SetSensorConfig(_) => 8,
            Self::GetExposure => 9,
            Self::SetExposure(_) => 10,
            Self::CaptureFrame => 11,
            Self::AutoExposure => 12,
            Self::GetAutoExposeConfig => 13,
            Self::SetAutoExposeConfig(_) => 14,
        }
    }

    /// Command name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetBridgeLed { .. } => "SetBridgeLED",
            Self::SetSensorLed { .. } => "SetSensorLED",
            Self::SetSensorConfig(_) => "SetSensorConfig",
            Self::GetExposure => "GetExposure",
            Self::SetExposure(_) => "SetExposure",
            Self::CaptureFrame => "CaptureFrame",
            Self::AutoExposure => "AutoExposure",
            Self::GetAutoExposeConfig => "GetAutoExposeConfig",
            Self::SetAutoExposeConfig(_) => "SetAutoExposeConfig",
        }
    }

    /// Whether the sensor board sends a second reply
    pub fn has_sensor_reply(&self) -> bool {
        !matches!(self, Self::SetBridgeLed { .. })
    }

    /// Serialize the command for the wire
    pub fn encode(&self) -> CommandBytes {
        let mut bytes = CommandBytes::new();
        bytes.push(self.id());
        match *self {
            Self::SetBridgeLed { led, state } | Self::SetSensorLed { led, state } => {
                bytes.extend_from_slice(&[led, state as u8]);
            }
            Self::SetSensorConfig(config) => {
                bytes.extend_from_slice(&[
                    config.binning.as_byte(),
                    config.gain,
                    config.row_bitmap,
                ]);
            }
            Self::SetExposure(exposure) => {
                bytes.extend_from_slice(&exposure.cycles().to_be_bytes());
            }
            Self::SetAutoExposeConfig(config) => {
                bytes.push(config.max_tries);
                for value in [
                    config.pixels.start,
                    config.pixels.stop,
                    config.target,
                    config.tolerance,
                    config.max_exposure,
                ] {
                    bytes.extend_from_slice(&value.to_be_bytes());
                }
            }
            Self::GetExposure
            | Self::CaptureFrame
            | Self::AutoExposure
            | Self::GetAutoExposeConfig => {}
        }
        bytes
    }
}

/// Read the complete reply to `command` from `reader`
///
/// A read timeout maps to [`MicrospecError::ReplyTimeout`]; a non-OK status
/// maps to [`MicrospecError::DeviceStatus`].
pub fn read_reply<R: Read + ?Sized>(reader: &mut R, command: &Command) -> Result<Reply> {
    let name = command.name();

    let bridge_status = read_u8(reader, name)?;
    check_status(name, bridge_status)?;
    if !command.has_sensor_reply() {
        return Ok(Reply::Done);
    }

    let sensor_status = read_u8(reader, name)?;
    check_status(name, sensor_status)?;

    match command {
        Command::GetExposure => {
            let cycles = read_u16(reader, name)?;
            Ok(Reply::Exposure(Exposure::from_cycles(cycles)))
        }
        Command::CaptureFrame => {
            let count = usize::from(read_u16(reader, name)?);
            if count > MAX_FRAME_PIXELS {
                return Err(MicrospecError::Protocol {
                    command: name,
                    reason: format!("frame of {count} pixels exceeds {MAX_FRAME_PIXELS}"),
                });
            }
            let mut raw = vec![0u8; count * 2];
            read_exact(reader, &mut raw, name)?;
            let pixels = raw
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            Ok(Reply::Frame(Frame { pixels }))
        }
        Command::AutoExposure => {
            let success = read_u8(reader, name)? != 0;
            let iterations = read_u16(reader, name)?;
            Ok(Reply::AutoExpose(AutoExposeResult {
                success,
                iterations,
            }))
        }
        Command::GetAutoExposeConfig => {
            let max_tries = read_u8(reader, name)?;
            let start = read_u16(reader, name)?;
            let stop = read_u16(reader, name)?;
            let target = read_u16(reader, name)?;
            let tolerance = read_u16(reader, name)?;
            let max_exposure = read_u16(reader, name)?;
            Ok(Reply::AutoExposeConfig(AutoExposeConfig {
                max_tries,
                pixels: PixelRange::new(start, stop),
                target,
                tolerance,
                max_exposure,
            }))
        }
        Command::SetBridgeLed { .. }
        | Command::SetSensorLed { .. }
        | Command::SetSensorConfig(_)
        | Command::SetExposure(_)
        | Command::SetAutoExposeConfig(_) => Ok(Reply::Done),
    }
}

fn check_status(command: &'static str, status: u8) -> Result<()> {
    if status == STATUS_OK {
        Ok(())
    } else {
        Err(MicrospecError::DeviceStatus { command, status })
    }
}

fn read_u8<R: Read + ?Sized>(reader: &mut R, command: &'static str) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact(reader, &mut buf, command)?;
    Ok(buf[0])
}

fn read_u16<R: Read + ?Sized>(reader: &mut R, command: &'static str) -> Result<u16> {
    let mut buf = [0u8; 2];
    read_exact(reader, &mut buf, command)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_exact<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    command: &'static str,
) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            MicrospecError::ReplyTimeout(command)
        }
        io::ErrorKind::UnexpectedEof => MicrospecError::Protocol {
            command,
            reason: "reply ended early".to_string(),
        },
        _ => MicrospecError::SerialLink(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::kit::Binning;
    use std::io::Cursor;

    fn reply(command: &Command, bytes: &[u8]) -> Result<Reply> {
        read_reply(&mut Cursor::new(bytes.to_vec()), command)
    }

    #[test]
    fn test_encode_set_exposure_is_big_endian() {
        let bytes = Command::SetExposure(Exposure::from_cycles(0x1234)).encode();
        assert_eq!(bytes.as_slice(), &[10, 0x12, 0x34]);
    }

    #[test]
    fn test_encode_sensor_config() {
        let command = Command::SetSensorConfig(SensorConfig {
            binning: Binning::On,
            gain: 0x01,
            row_bitmap: 0x1F,
        });
        assert_eq!(command.encode().as_slice(), &[8, 1, 0x01, 0x1F]);
    }

    #[test]
    fn test_encode_auto_expose_config() {
        let command = Command::SetAutoExposeConfig(AutoExposeConfig {
            max_tries: 12,
            pixels: PixelRange::new(220, 373),
            target: 46420,
            tolerance: 3277,
            max_exposure: 10000,
        });
        assert_eq!(
            command.encode().as_slice(),
            &[14, 12, 0x00, 0xDC, 0x01, 0x75, 0xB5, 0x54, 0x0C, 0xCD, 0x27, 0x10]
        );
    }

    #[test]
    fn test_bridge_led_has_no_sensor_reply() {
        let command = Command::SetBridgeLed {
            led: 0,
            state: LedState::Green,
        };
        assert_eq!(command.encode().as_slice(), &[2, 0, 1]);
        assert_eq!(reply(&command, &[STATUS_OK]).unwrap(), Reply::Done);
    }

    #[test]
    fn test_decode_exposure() {
        let decoded = reply(&Command::GetExposure, &[0, 0, 0x00, 0x32]).unwrap();
        assert_eq!(decoded, Reply::Exposure(Exposure::from_cycles(50)));
    }

    /// Serial port that delivers `data` and then stops answering
    struct StallingPort {
        data: Cursor<Vec<u8>>,
    }

    impl Read for StallingPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_frame_reply_stalling_midway_times_out() {
        // Header promises three pixels, only one and a half arrive
        let mut port = StallingPort {
            data: Cursor::new(vec![0, 0, 0x00, 0x03, 0x00, 0x01, 0x01]),
        };
        let err = read_reply(&mut port, &Command::CaptureFrame).unwrap_err();
        assert!(matches!(err, MicrospecError::ReplyTimeout("CaptureFrame")));
    }

    #[test]
    fn test_silent_device_times_out() {
        let mut port = StallingPort {
            data: Cursor::new(Vec::new()),
        };
        let err = read_reply(&mut port, &Command::GetExposure).unwrap_err();
        assert!(matches!(err, MicrospecError::ReplyTimeout("GetExposure")));
    }

    #[test]
    fn test_decode_frame() {
        let bytes = [0, 0, 0x00, 0x03, 0x00, 0x01, 0x01, 0x00, 0xFF, 0xFF];
        let decoded = reply(&Command::CaptureFrame, &bytes).unwrap();
        assert_eq!(
            decoded,
            Reply::Frame(Frame {
                pixels: vec![1, 256, 65535]
            })
        );
    }

    #[test]
    fn test_decode_auto_expose() {
        let decoded = reply(&Command::AutoExposure, &[0, 0, 1, 0x00, 0x05]).unwrap();
        assert_eq!(
            decoded,
            Reply::AutoExpose(AutoExposeResult {
                success: true,
                iterations: 5
            })
        );
    }

    #[test]
    fn test_decode_auto_expose_config() {
        let bytes = [0, 0, 12, 0x00, 0xDC, 0x01, 0x75, 0xB5, 0x54, 0x0C, 0xCD, 0x10, 0x10];
        let Reply::AutoExposeConfig(config) =
            reply(&Command::GetAutoExposeConfig, &bytes).unwrap()
        else {
            panic!("expected auto-expose config reply");
        };
        assert_eq!(config.pixels, PixelRange::new(220, 373));
        assert_eq!(config.max_exposure, 4112);
    }

    #[test]
    fn test_error_status_is_reported() {
        let err = reply(&Command::GetExposure, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            MicrospecError::DeviceStatus {
                command: "GetExposure",
                status: 1
            }
        ));
    }

    #[test]
    fn test_truncated_reply_is_protocol_error() {
        let err = reply(&Command::CaptureFrame, &[0, 0, 0x00, 0x02, 0x00]).unwrap_err();
        assert!(matches!(err, MicrospecError::Protocol { .. }));
    }

    #[test]
    fn test_oversized_frame_is_rejected() {
        let err = reply(&Command::CaptureFrame, &[0, 0, 0xFF, 0xFF]).unwrap_err();
        assert!(matches!(err, MicrospecError::Protocol { command: "CaptureFrame", .. }));
    }
}
