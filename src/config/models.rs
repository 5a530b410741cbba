//! Configuration data models
//!
//! This module defines the data structures used for application configuration.
//! Every section falls back to its defaults field by field, so a partial
//! `config.json` only needs the values it changes.

use crate::device::{AutoExposeConfig, Binning, PixelRange, SensorConfig};
use crate::error::{MicrospecError, Result, StringError};
use crate::exposure::Exposure;
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which dev-kit to talk to and how
    pub device: DeviceSettings,
    /// Sensor pixel configuration
    pub sensor: SensorSettings,
    /// Firmware auto-expose parameters
    pub auto_expose: AutoExposeSettings,
    /// Plot geometry and refresh rate
    pub display: DisplaySettings,
}

/// Dev-kit backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceBackend {
    /// Real dev-kit over USB serial
    #[default]
    Serial,
    /// Synthetic spectra, no hardware needed
    Simulated,
}

/// Dev-kit connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Backend to open
    pub backend: DeviceBackend,
    /// Serial port name; discovered by USB serial number when unset
    pub port: Option<String>,
    /// Pick this dev-kit when several are attached
    pub serial_number: Option<String>,
    /// Serial baud rate
    pub baud_rate: u32,
    /// How long to wait for a reply, in milliseconds
    pub timeout_ms: u64,
}

/// Sensor pixel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    /// Pixel binning mode
    pub binning: Binning,
    /// Analog gain code
    pub gain: u8,
    /// Active row bitmap
    pub row_bitmap: u8,
    /// Exposure applied at startup, in milliseconds
    pub initial_exposure_ms: f64,
}

/// Firmware auto-expose settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoExposeSettings {
    /// Maximum adjustments per run
    pub max_tries: u8,
    /// Target peak counts
    pub target: u16,
    /// Accepted deviation from the target
    pub tolerance: u16,
    /// Longest exposure the loop may choose, in cycles
    pub max_exposure: u16,
    /// First meaningful pixel; binning default when unset
    pub start_pixel: Option<u16>,
    /// Last meaningful pixel; binning default when unset
    pub stop_pixel: Option<u16>,
}

/// Plot layout and refresh settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Frames per second (1-200)
    pub frame_rate: u32,
    /// Height of the plot area in screen pixels
    pub plot_height: u32,
    /// Space between the plot top and the window top
    pub margin: u32,
    /// Space below the x-axis
    pub x_axis_space: u32,
    /// Space left of the y-axis
    pub y_axis_space: u32,
    /// Counts level drawn as the maximum dark reading
    pub max_dark: u16,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            backend: DeviceBackend::Serial,
            port: None,
            serial_number: None,
            baud_rate: 115_200,
            timeout_ms: 5000,
        }
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            binning: Binning::On,
            gain: 0x01,
            row_bitmap: 0x1F,
            initial_exposure_ms: 1.0,
        }
    }
}

impl Default for AutoExposeSettings {
    fn default() -> Self {
        Self {
            max_tries: 12,
            target: 46420,
            tolerance: 3277,
            max_exposure: 10000,
            start_pixel: None,
            stop_pixel: None,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            frame_rate: 50,
            plot_height: 300,
            margin: 20,
            x_axis_space: 40,
            y_axis_space: 40,
            max_dark: 4500,
        }
    }
}

impl AppConfig {
    /// Meaningful pixel range, overrides applied over the binning default
    pub fn pixel_range(&self) -> PixelRange {
        let default = self.sensor.binning.default_pixel_range();
        PixelRange::new(
            self.auto_expose.start_pixel.unwrap_or(default.start),
            self.auto_expose.stop_pixel.unwrap_or(default.stop),
        )
    }

    /// Sensor configuration to send at startup
    pub fn sensor_config(&self) -> SensorConfig {
        SensorConfig {
            binning: self.sensor.binning,
            gain: self.sensor.gain,
            row_bitmap: self.sensor.row_bitmap,
        }
    }

    /// Auto-expose configuration to send at startup
    pub fn auto_expose_config(&self) -> AutoExposeConfig {
        AutoExposeConfig {
            max_tries: self.auto_expose.max_tries,
            pixels: self.pixel_range(),
            target: self.auto_expose.target,
            tolerance: self.auto_expose.tolerance,
            max_exposure: self.auto_expose.max_exposure,
        }
    }

    /// Exposure to apply at startup
    pub fn initial_exposure(&self) -> Exposure {
        Exposure::from_ms(self.sensor.initial_exposure_ms)
    }

    /// Reject settings the viewer cannot work with
    pub fn validate(&self) -> Result<()> {
        let range = self.pixel_range();
        let frame_len = self.sensor.binning.frame_len();
        if range.start == 0 || range.start > range.stop || usize::from(range.stop) > frame_len {
            return Err(invalid(format!(
                "pixel range {}..={} does not fit a {frame_len}-pixel frame",
                range.start, range.stop
            )));
        }
        if !(1..=200).contains(&self.display.frame_rate) {
            return Err(invalid(format!(
                "frame rate {} is outside 1..=200",
                self.display.frame_rate
            )));
        }
        if self.display.plot_height == 0 {
            return Err(invalid("plot height must be positive".to_string()));
        }
        if self.auto_expose.max_exposure == 0 {
            return Err(invalid("auto-expose max exposure must be positive".to_string()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> MicrospecError {
    MicrospecError::ConfigError(StringError::new(message))
}
