//! USB serial dev-kit client
//!
//! The dev-kit enumerates as an FTDI USB serial port whose serial number starts
//! with `CHROMATION`. Commands are written and replies read synchronously.

use crate::config::DeviceSettings;
use crate::device::kit::{
    AutoExposeConfig, AutoExposeResult, DevKit, Frame, LedState, SensorConfig,
};
use crate::device::protocol::{Command, Reply, read_reply};
use crate::error::{MicrospecError, Result};
use crate::exposure::Exposure;
use serialport::{ClearBuffer, SerialPort, SerialPortType};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// USB serial number prefix of every Chromation dev-kit
pub const SERIAL_NUMBER_PREFIX: &str = "CHROMATION";

/// Dev-kit connected over USB serial
pub struct SerialKit {
    port: Box<dyn SerialPort>,
    serial_number: String,
}

impl SerialKit {
    /// Open the dev-kit described by `settings`
    ///
    /// Uses `settings.port` when set, otherwise scans USB serial ports for a
    /// dev-kit (matching `settings.serial_number` if one is configured).
    pub fn open(settings: &DeviceSettings) -> Result<Self> {
        let (port_name, serial_number) = match &settings.port {
            Some(port) => {
                let serial_number = match &settings.serial_number {
                    Some(serial) => serial.clone(),
                    None => lookup_serial_number(port),
                };
                (port.clone(), serial_number)
            }
            None => {
                let ports = usb_serial_numbers()?;
                match_devkit(&ports, settings.serial_number.as_deref())
                    .cloned()
                    .ok_or(MicrospecError::DevKitNotFound)?
            }
        };

        info!(
            "Opening dev-kit {} on {} at {} baud",
            serial_number, port_name, settings.baud_rate
        );
        let port = serialport::new(&port_name, settings.baud_rate)
            .timeout(Duration::from_millis(settings.timeout_ms))
            .open()?;
        port.clear(ClearBuffer::All)?;

        Ok(Self {
            port,
            serial_number,
        })
    }

    fn transact(&mut self, command: Command) -> Result<Reply> {
        debug!("-> {}", command.name());
        self.port
            .write_all(&command.encode())
            .map_err(|e| MicrospecError::SerialLink(Box::new(e)))?;
        read_reply(&mut *self.port, &command)
    }

    fn expect_done(&mut self, command: Command) -> Result<()> {
        match self.transact(command)? {
            Reply::Done => Ok(()),
            other => Err(unexpected(&command, &other)),
        }
    }
}

fn unexpected(command: &Command, reply: &Reply) -> MicrospecError {
    MicrospecError::Protocol {
        command: command.name(),
        reason: format!("unexpected reply {reply:?}"),
    }
}

/// `(port name, USB serial number)` of every USB serial port that reports one
fn usb_serial_numbers() -> Result<Vec<(String, String)>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .filter_map(|port| match port.port_type {
            SerialPortType::UsbPort(usb) => {
                usb.serial_number.map(|serial| (port.port_name, serial))
            }
            _ => None,
        })
        .collect())
}

/// First dev-kit among `ports`, restricted to `wanted_serial` if given
fn match_devkit<'a>(
    ports: &'a [(String, String)],
    wanted_serial: Option<&str>,
) -> Option<&'a (String, String)> {
    ports.iter().find(|(port_name, serial)| {
        let matched = is_devkit_serial(serial, wanted_serial);
        if !matched {
            debug!("Skipping {} ({})", port_name, serial);
        }
        matched
    })
}

/// USB serial number reported for `port_name`, if any
fn serial_for_port<'a>(ports: &'a [(String, String)], port_name: &str) -> Option<&'a str> {
    ports
        .iter()
        .find(|(name, _)| name == port_name)
        .map(|(_, serial)| serial.as_str())
}

/// Serial number for a port given explicitly in config
///
/// Falls back to the port name when the port does not report one.
fn lookup_serial_number(port_name: &str) -> String {
    let ports = usb_serial_numbers().unwrap_or_else(|e| {
        warn!("Could not list serial ports: {}", e);
        Vec::new()
    });
    serial_for_port(&ports, port_name).map_or_else(
        || {
            warn!("{} reports no USB serial number", port_name);
            port_name.to_string()
        },
        str::to_string,
    )
}

/// Whether a USB serial number belongs to a dev-kit, and to the wanted one if given
fn is_devkit_serial(serial: &str, wanted_serial: Option<&str>) -> bool {
    serial.starts_with(SERIAL_NUMBER_PREFIX)
        && wanted_serial.is_none_or(|wanted| serial.contains(wanted))
}

impl DevKit for SerialKit {
    fn serial_number(&self) -> &str {
        &self.serial_number
    }

    fn set_bridge_led(&mut self, led: u8, state: LedState) -> Result<()> {
        self.expect_done(Command::SetBridgeLed { led, state })
    }

    fn set_sensor_led(&mut self, led: u8, state: LedState) -> Result<()> {
        self.expect_done(Command::SetSensorLed { led, state })
    }

    fn set_sensor_config(&mut self, config: SensorConfig) -> Result<()> {
        self.expect_done(Command::SetSensorConfig(config))
    }

    fn set_exposure(&mut self, exposure: Exposure) -> Result<()> {
        self.expect_done(Command::SetExposure(exposure))
    }

    fn get_exposure(&mut self) -> Result<Exposure> {
        let command = Command::GetExposure;
        match self.transact(command)? {
            Reply::Exposure(exposure) => Ok(exposure),
            other => Err(unexpected(&command, &other)),
        }
    }

    fn set_auto_expose_config(&mut self, config: &AutoExposeConfig) -> Result<()> {
        self.expect_done(Command::SetAutoExposeConfig(*config))
    }

    fn get_auto_expose_config(&mut self) -> Result<AutoExposeConfig> {
        let command = Command::GetAutoExposeConfig;
        match self.transact(command)? {
            Reply::AutoExposeConfig(config) => Ok(config),
            other => Err(unexpected(&command, &other)),
        }
    }

    fn auto_expose(&mut self) -> Result<AutoExposeResult> {
        let command = Command::AutoExposure;
        match self.transact(command)? {
            Reply::AutoExpose(result) => Ok(result),
            other => Err(unexpected(&command, &other)),
        }
    }

    fn capture_frame(&mut self) -> Result<Option<Frame>> {
        let frame = captured_frame(self.transact(Command::CaptureFrame))?;
        if frame.is_none() {
            debug!("Frame dropped: no reply from dev-kit");
            // Discard a late partial reply so the next command starts clean
            self.port.clear(ClearBuffer::Input)?;
        }
        Ok(frame)
    }
}

/// Frame carried by a `CaptureFrame` reply; a reply timeout is a dropped frame
fn captured_frame(reply: Result<Reply>) -> Result<Option<Frame>> {
    match reply {
        Ok(Reply::Frame(frame)) => Ok(Some(frame)),
        Ok(other) => Err(unexpected(&Command::CaptureFrame, &other)),
        Err(MicrospecError::ReplyTimeout(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
