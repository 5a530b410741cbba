//! Dev-kit client interface
//!
//! The `DevKit` trait is the seam between the application and the hardware.
//! `SerialKit` talks to a real dev-kit over USB serial; `SimulatedKit` produces
//! synthetic spectra for demos and tests.

use crate::error::Result;
use crate::exposure::Exposure;
use serde::{Deserialize, Serialize};

/// Full-scale pixel reading of the 16-bit ADC
pub const FULL_SCALE_COUNTS: u16 = u16::MAX;

/// Indicator LED setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedState {
    /// LED off
    Off = 0,
    /// LED green
    Green = 1,
    /// LED red
    Red = 2,
}

/// Sensor pixel binning mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binning {
    /// Adjacent pixels combined: 392 pixels per frame
    On,
    /// Every pixel read out: 784 pixels per frame
    Off,
}

impl Binning {
    /// Number of pixels in one captured frame
    pub fn frame_len(self) -> usize {
        match self {
            Self::On => 392,
            Self::Off => 784,
        }
    }

    /// Pixel range with a usable wavelength mapping
    pub fn default_pixel_range(self) -> PixelRange {
        match self {
            Self::On => PixelRange::new(220, 373),
            Self::Off => PixelRange::new(440, 746),
        }
    }

    /// Wire value sent in `SetSensorConfig`
    pub fn as_byte(self) -> u8 {
        match self {
            Self::On => 1,
            Self::Off => 0,
        }
    }
}

/// Inclusive range of 1-based pixel numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRange {
    /// First pixel in the range
    pub start: u16,
    /// Last pixel in the range
    pub stop: u16,
}

impl PixelRange {
    /// Create a range from `start` to `stop`, both inclusive
    pub const fn new(start: u16, stop: u16) -> Self {
        Self { start, stop }
    }

    /// Whether `pixel` lies in the range
    pub fn contains(self, pixel: usize) -> bool {
        (usize::from(self.start)..=usize::from(self.stop)).contains(&pixel)
    }

    /// Clamp `pixel` into the range
    pub fn clamp(self, pixel: usize) -> usize {
        pixel.clamp(usize::from(self.start), usize::from(self.stop))
    }
}

/// Sensor pixel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorConfig {
    /// Binning mode
    pub binning: Binning,
    /// Analog gain code (`0x01` is 1x)
    pub gain: u8,
    /// Bitmap of active pixel rows (`0x1F` is all five rows)
    pub row_bitmap: u8,
}

/// Parameters of the firmware auto-expose loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoExposeConfig {
    /// Maximum number of exposure adjustments before giving up
    pub max_tries: u8,
    /// Pixels the firmware inspects for the peak
    pub pixels: PixelRange,
    /// Target peak counts
    pub target: u16,
    /// Accepted deviation from `target`
    pub tolerance: u16,
    /// Longest exposure the loop may choose, in cycles
    pub max_exposure: u16,
}

/// Outcome of one firmware auto-expose run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoExposeResult {
    /// Whether the peak landed inside the target band
    pub success: bool,
    /// Number of exposure adjustments the firmware made
    pub iterations: u16,
}

impl Default for AutoExposeResult {
    fn default() -> Self {
        Self {
            success: true,
            iterations: 1,
        }
    }
}

/// One captured frame of pixel counts, pixel 1 first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Counts per pixel
    pub pixels: Vec<u16>,
}

/// Commands understood by a spectrometer dev-kit
///
/// Every call blocks until the dev-kit replies.
pub trait DevKit {
    /// USB serial number of the dev-kit
    fn serial_number(&self) -> &str;

    /// Set an indicator LED on the USB bridge board
    fn set_bridge_led(&mut self, led: u8, state: LedState) -> Result<()>;

    /// Set an indicator LED on the sensor board
    fn set_sensor_led(&mut self, led: u8, state: LedState) -> Result<()>;

    /// Configure binning, gain and active rows
    fn set_sensor_config(&mut self, config: SensorConfig) -> Result<()>;

    /// Set the exposure time
    fn set_exposure(&mut self, exposure: Exposure) -> Result<()>;

    /// Read back the exposure time
    fn get_exposure(&mut self) -> Result<Exposure>;

    /// Configure the auto-expose loop
    fn set_auto_expose_config(&mut self, config: &AutoExposeConfig) -> Result<()>;

    /// Read back the auto-expose configuration
    fn get_auto_expose_config(&mut self) -> Result<AutoExposeConfig>;

    /// Run the auto-expose loop; the chosen exposure becomes current
    fn auto_expose(&mut self) -> Result<AutoExposeResult>;

    /// Capture one frame. `Ok(None)` is a dropped frame.
    fn capture_frame(&mut self) -> Result<Option<Frame>>;
}

impl<K: DevKit + ?Sized> DevKit for Box<K> {
    fn serial_number(&self) -> &str {
        (**self).serial_number()
    }

    fn set_bridge_led(&mut self, led: u8, state: LedState) -> Result<()> {
        (**self).set_bridge_led(led, state)
    }

    fn set_sensor_led(&mut self, led: u8, state: LedState) -> Result<()> {
        (**self).set_sensor_led(led, state)
    }

    fn set_sensor_config(&mut self, config: SensorConfig) -> Result<()> {
        (**self).set_sensor_config(config)
    }

    fn set_exposure(&mut self, exposure: Exposure) -> Result<()> {
        (**self).set_exposure(exposure)
    }

    fn get_exposure(&mut self) -> Result<Exposure> {
        (**self).get_exposure()
    }

    fn set_auto_expose_config(&mut self, config: &AutoExposeConfig) -> Result<()> {
        (**self).set_auto_expose_config(config)
    }

    fn get_auto_expose_config(&mut self) -> Result<AutoExposeConfig> {
        (**self).get_auto_expose_config()
    }

    fn auto_expose(&mut self) -> Result<AutoExposeResult> {
        (**self).auto_expose()
    }

    fn capture_frame(&mut self) -> Result<Option<Frame>> {
        (**self).capture_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binning_frame_lengths() {
        assert_eq!(Binning::On.frame_len(), 392);
        assert_eq!(Binning::Off.frame_len(), 784);
    }

    #[test]
    fn test_default_pixel_ranges() {
        assert_eq!(Binning::On.default_pixel_range(), PixelRange::new(220, 373));
        assert_eq!(Binning::Off.default_pixel_range(), PixelRange::new(440, 746));
    }

    #[test]
    fn test_pixel_range_clamp_and_contains() {
        let range = PixelRange::new(220, 373);
        assert!(range.contains(220));
        assert!(range.contains(373));
        assert!(!range.contains(374));
        assert_eq!(range.clamp(10), 220);
        assert_eq!(range.clamp(400), 373);
        assert_eq!(range.clamp(300), 300);
    }

    #[test]
    fn test_auto_expose_result_default() {
        let result = AutoExposeResult::default();
        assert!(result.success);
        assert_eq!(result.iterations, 1);
    }
}
